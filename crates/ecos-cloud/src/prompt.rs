//! Operator confirmations requested during destroy

/// How hard it should be to say yes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmLevel {
    /// Every listed resource carries the ownership tag.
    Standard,
    /// At least one resource is unmanaged or could not be verified.
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Proceed with destroying every previewed resource.
    Destroy { level: ConfirmLevel },
    /// The bucket still holds objects; delete them together with the bucket.
    DeleteBucketContents { bucket: String },
}

impl Confirmation {
    pub fn question(&self) -> String {
        match self {
            Confirmation::Destroy {
                level: ConfirmLevel::Standard,
            } => "Do you want to proceed with destroying these resources".to_string(),
            Confirmation::Destroy {
                level: ConfirmLevel::Strong,
            } => "Do you STILL want to destroy ALL listed resources".to_string(),
            Confirmation::DeleteBucketContents { bucket } => {
                format!("Bucket '{bucket}' is not empty. Continue deleting this bucket and all of its objects")
            }
        }
    }
}

/// Source of operator decisions. The CLI reads stdin; tests script answers.
pub trait Prompter: Send + Sync {
    fn confirm(&self, request: &Confirmation) -> bool;
}

/// Answers every confirmation with the same value.
#[derive(Debug, Clone, Copy)]
pub struct FixedPrompter(pub bool);

impl Prompter for FixedPrompter {
    fn confirm(&self, _request: &Confirmation) -> bool {
        self.0
    }
}
