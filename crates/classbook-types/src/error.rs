use crate::id::ClassId;

#[derive(Clone, Debug, thiserror::Error)]
pub enum DomainError {
    #[error("class {class_id} must have a positive capacity")]
    ZeroCapacity { class_id: ClassId },
}
