use crate::application_port::SocialError;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

pub struct MemoryRelationshipRepo {
    edges: DashMap<(UserId, UserId), FriendEdge>,
}

impl MemoryRelationshipRepo {
    pub fn new() -> Self {
        Self {
            edges: DashMap::new(),
        }
    }

    fn lookup(&self, subject: UserId, object: UserId) -> Option<FriendEdge> {
        self.edges.get(&(subject, object)).map(|e| e.clone())
    }
}

impl Default for MemoryRelationshipRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RelationshipRepo for MemoryRelationshipRepo {
    async fn get_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError> {
        Ok(self.lookup(subject, object))
    }

    async fn insert_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), SocialError> {
        // entry API gives the same one-winner semantics as a unique key
        match self.edges.entry((edge.subject, edge.object)) {
            Entry::Occupied(_) => Err(SocialError::RelationshipExists),
            Entry::Vacant(slot) => {
                slot.insert(edge.clone());
                Ok(())
            }
        }
    }

    async fn upsert_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        edge: &FriendEdge,
    ) -> Result<(), SocialError> {
        self.edges
            .insert((edge.subject, edge.object), edge.clone());
        Ok(())
    }

    async fn delete_in_tx(
        &self,
        _tx: &mut dyn StorageTx<'_>,
        subject: UserId,
        object: UserId,
    ) -> Result<(), SocialError> {
        self.edges.remove(&(subject, object));
        Ok(())
    }

    async fn get(
        &self,
        subject: UserId,
        object: UserId,
    ) -> Result<Option<FriendEdge>, SocialError> {
        Ok(self.lookup(subject, object))
    }

    async fn list_by_subject(&self, user: UserId) -> Result<Vec<FriendEdge>, SocialError> {
        let mut edges: Vec<FriendEdge> = self
            .edges
            .iter()
            .filter(|e| e.subject == user)
            .map(|e| e.clone())
            .collect();
        edges.sort_by_key(|e| (e.status, e.object));
        Ok(edges)
    }
}
