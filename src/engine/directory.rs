use dashmap::DashMap;

use crate::errors::Result;
use crate::types::{Member, MemberId};

/// membership store consumed by the engine, read-only
pub trait MemberDirectory: Send + Sync {
    fn get_member(&self, member_id: &MemberId) -> Result<Option<Member>>;

    fn list_members(&self) -> Result<Vec<Member>>;
}

/// in-memory member directory
#[derive(Debug, Default)]
pub struct InMemoryMemberDirectory {
    members: DashMap<MemberId, Member>,
}

impl InMemoryMemberDirectory {
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
        }
    }

    pub fn with_members(members: impl IntoIterator<Item = Member>) -> Self {
        let directory = Self::new();
        for member in members {
            directory.upsert(member);
        }
        directory
    }

    /// insert or replace a member, as the membership module does on edit
    pub fn upsert(&self, member: Member) {
        self.members.insert(member.id, member);
    }

    pub fn remove(&self, member_id: &MemberId) -> Option<Member> {
        self.members.remove(member_id).map(|(_, member)| member)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl MemberDirectory for InMemoryMemberDirectory {
    fn get_member(&self, member_id: &MemberId) -> Result<Option<Member>> {
        Ok(self.members.get(member_id).map(|entry| entry.value().clone()))
    }

    /// members ordered by name, then id
    fn list_members(&self) -> Result<Vec<Member>> {
        let mut members: Vec<Member> = self.members.iter().map(|entry| entry.value().clone()).collect();
        members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(members)
    }
}
