use uuid::Uuid;

/// Trait for entities with a unique identifier
pub trait Identifiable {
    fn get_id(&self) -> Uuid;
}
