use serde::{Deserialize, Serialize};

/// Qualitative band derived purely from the clamped score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusLabel {
    Excellent,
    Good,
    Average,
    Bad,
    Awful,
}

impl StatusLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::Excellent,
            60..=79 => Self::Good,
            40..=59 => Self::Average,
            20..=39 => Self::Bad,
            _ => Self::Awful,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusLabel::Excellent => "Excellent",
            StatusLabel::Good => "Good",
            StatusLabel::Average => "Average",
            StatusLabel::Bad => "Bad",
            StatusLabel::Awful => "Awful",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            StatusLabel::Excellent => "🤩",
            StatusLabel::Good => "🙂",
            StatusLabel::Average => "😐",
            StatusLabel::Bad => "☹️",
            StatusLabel::Awful => "🤢",
        }
    }

    /// Display colour as a hex triplet.
    pub fn color(&self) -> &'static str {
        match self {
            StatusLabel::Excellent => "#2e7d32",
            StatusLabel::Good => "#7cb342",
            StatusLabel::Average => "#fbc02d",
            StatusLabel::Bad => "#f57c00",
            StatusLabel::Awful => "#c62828",
        }
    }
}

impl std::fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
