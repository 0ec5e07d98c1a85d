use thiserror::Error;

use crate::state_machine::RitualState;

#[derive(Debug, Error)]
pub enum CropError {
    #[error("A ritual is already {0}; reset before offering another image.")]
    Rejected(RitualState),

    #[error("The portal is closed while {0}.")]
    PortalClosed(RitualState),

    #[error("Only images can be offered to the portal (got {0}).")]
    NotAnImage(String),

    #[error("Nothing to export. Complete a ritual first.")]
    NothingToExport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_names_the_state() {
        let err = CropError::Rejected(RitualState::Severing);
        assert_eq!(
            err.to_string(),
            "A ritual is already SEVERING; reset before offering another image."
        );
    }

    #[test]
    fn not_an_image_names_the_mime() {
        let err = CropError::NotAnImage("text/plain".into());
        assert!(err.to_string().contains("text/plain"));
    }
}
