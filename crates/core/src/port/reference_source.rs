// Reference Dataset Port
// The fixed dataset every engine fits against; read-only, shared by all jobs

use super::columnar_store::StoreError;
use crate::domain::RowBatch;

/// Reference dataset source
pub trait ReferenceSource: Send + Sync {
    /// Load the full reference batch
    fn load(&self) -> Result<RowBatch, StoreError>;

    /// Human-readable location (for logs and error messages)
    fn location(&self) -> String;
}

pub mod mocks {
    use super::*;

    /// Reference held in memory
    pub struct StaticReference(pub RowBatch);

    impl ReferenceSource for StaticReference {
        fn load(&self) -> Result<RowBatch, StoreError> {
            Ok(self.0.clone())
        }

        fn location(&self) -> String {
            "memory://reference".to_string()
        }
    }
}
