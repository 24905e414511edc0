//! Instruction builders for the two generation flows.

use crate::domain::{CompletionPrompt, EmailDraftRequest, EnhancementRequest, Tone};

pub fn enhancement_instruction(tone: Tone) -> String {
    format!(
        "You are a professional editor. Enhance the following text to improve its grammar \
         and fluency while maintaining its original meaning. Use a {} tone in the enhanced text.",
        tone.as_str()
    )
}

pub fn email_instruction(tone: Tone) -> String {
    format!(
        "You are a professional email assistant. Generate a response based on the draft \
         points provided. Use a {} tone and maintain proper email formatting.",
        tone.as_str()
    )
}

/// Joins the email being answered and the reply bullet points under labels.
pub fn email_user_content(original_email: &str, draft_points: &str) -> String {
    format!(
        "Original Email: {}\n\nDraft Points: {}",
        original_email, draft_points
    )
}

impl EnhancementRequest {
    pub fn to_prompt(&self) -> CompletionPrompt {
        CompletionPrompt {
            system: enhancement_instruction(self.tone),
            user: self.text.clone(),
        }
    }
}

impl EmailDraftRequest {
    pub fn to_prompt(&self) -> CompletionPrompt {
        CompletionPrompt {
            system: email_instruction(self.tone),
            user: email_user_content(&self.original_email, &self.draft_points),
        }
    }
}
