//! Stage-specific sales email prompts.

use crate::GenerationRequest;
use dealflow_core::DealStage;

pub const SYSTEM_INSTRUCTION: &str = "You are a professional sales communication expert. \
Generate clear, professional, and persuasive email templates for CRM deal stages. \
Keep emails concise, action-oriented, and appropriate for the stage.";

pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Deal facts interpolated into the prompt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmailPromptInput {
    pub deal_title: String,
    /// Stage name as given. Unknown stages get the generic template.
    pub stage: String,
    pub deal_value: Option<f64>,
    pub contact_name: Option<String>,
}

impl EmailPromptInput {
    /// ` worth $50000`, or empty for a missing or zero value.
    fn value_text(&self) -> String {
        match self.deal_value {
            Some(v) if v != 0.0 && v.is_finite() => format!(" worth ${}", format_amount(v)),
            _ => String::new(),
        }
    }

    /// ` for Ada Lovelace`, or empty.
    fn contact_text(&self) -> String {
        match self.contact_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => format!(" for {}", name),
            _ => String::new(),
        }
    }
}

fn format_amount(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

/// Stage whose template applies. Only the stage names themselves match,
/// ignoring case; shorthand such as `won` gets the generic template.
fn template_stage(name: &str) -> Option<DealStage> {
    let name = name.trim();
    DealStage::ALL
        .iter()
        .copied()
        .find(|stage| stage.as_db_str().eq_ignore_ascii_case(name))
}

/// Build the user prompt for a deal entering `input.stage`.
pub fn build_stage_prompt(input: &EmailPromptInput) -> String {
    let title = &input.deal_title;
    let value = input.value_text();
    let contact = input.contact_text();

    let Some(stage) = template_stage(&input.stage) else {
        return format!(
            "Generate a professional email template for the \"{}\" stage of deal \"{}\"{}{}.",
            input.stage, title, value, contact
        );
    };

    match stage {
        DealStage::Lead => format!(
            "Generate a professional introduction email for a new lead{contact}. \
The deal is titled \"{title}\"{value}. The email should:
- Introduce yourself and your company
- Express interest in understanding their needs
- Suggest a brief discovery call
- Be friendly and non-pushy
- Include a clear call-to-action"
        ),
        DealStage::Qualified => format!(
            "Generate a follow-up email for a qualified lead{contact}. \
The deal \"{title}\"{value} has been qualified. The email should:
- Reference previous conversation or interaction
- Provide more detailed information about solutions
- Address potential pain points
- Propose next steps or a demo
- Maintain enthusiasm and professionalism"
        ),
        DealStage::Proposal => format!(
            "Generate a proposal submission email{contact} for the deal \"{title}\"{value}. \
The email should:
- Formally introduce the attached proposal
- Highlight key benefits and value propositions
- Summarize the solution briefly
- Set expectations for review timeline
- Offer to address questions or concerns"
        ),
        DealStage::Negotiation => format!(
            "Generate a negotiation discussion email{contact} for the deal \"{title}\"{value}. \
The email should:
- Acknowledge we're in the negotiation phase
- Show flexibility and willingness to find mutual value
- Address any concerns raised previously
- Propose a meeting to discuss terms
- Maintain positive and collaborative tone"
        ),
        DealStage::ClosedWon => format!(
            "Generate a congratulatory onboarding email{contact} for the successfully closed \
deal \"{title}\"{value}. The email should:
- Express gratitude for choosing us
- Outline immediate next steps
- Introduce the onboarding process
- Provide key contact information
- Set positive expectations for the partnership"
        ),
        DealStage::ClosedLost => format!(
            "Generate a professional follow-up email{contact} for the deal \"{title}\"{value} \
that didn't close. The email should:
- Thank them for their time and consideration
- Express hope to work together in the future
- Offer to stay in touch
- Leave the door open professionally
- Maintain goodwill and positive relationship"
        ),
    }
}

/// Full generation request for a stage email with the default limits.
pub fn email_generation_request(input: &EmailPromptInput) -> GenerationRequest {
    GenerationRequest {
        system: SYSTEM_INSTRUCTION.to_string(),
        prompt: build_stage_prompt(input),
        max_tokens: DEFAULT_MAX_TOKENS,
        temperature: DEFAULT_TEMPERATURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(stage: &str) -> EmailPromptInput {
        EmailPromptInput {
            deal_title: "Fleet renewal".to_string(),
            stage: stage.to_string(),
            deal_value: Some(50000.0),
            contact_name: Some("Ada Lovelace".to_string()),
        }
    }

    #[test]
    fn test_proposal_prompt_mentions_proposal_submission() {
        let prompt = build_stage_prompt(&input("Proposal"));
        assert!(prompt.starts_with(
            "Generate a proposal submission email for Ada Lovelace for the deal \"Fleet renewal\" worth $50000."
        ));
        assert!(prompt.contains("- Formally introduce the attached proposal"));
    }

    #[test]
    fn test_lead_prompt_layout() {
        let prompt = build_stage_prompt(&input("Lead"));
        assert!(prompt.starts_with(
            "Generate a professional introduction email for a new lead for Ada Lovelace. The deal is titled \"Fleet renewal\" worth $50000. The email should:\n- Introduce yourself"
        ));
        assert_eq!(prompt.lines().count(), 6);
    }

    #[test]
    fn test_stage_match_ignores_case() {
        let prompt = build_stage_prompt(&input("closed won"));
        assert!(prompt.contains("congratulatory onboarding email"));
    }

    #[test]
    fn test_stage_shorthand_uses_generic_template() {
        for shorthand in ["won", "lost", "closed_won"] {
            let prompt = build_stage_prompt(&input(shorthand));
            assert!(prompt.starts_with(&format!(
                "Generate a professional email template for the \"{}\" stage",
                shorthand
            )));
        }
    }

    #[test]
    fn test_unknown_stage_uses_generic_template() {
        let prompt = build_stage_prompt(&input("Onboarding"));
        assert_eq!(
            prompt,
            "Generate a professional email template for the \"Onboarding\" stage of deal \"Fleet renewal\" worth $50000 for Ada Lovelace."
        );
    }

    #[test]
    fn test_zero_value_and_missing_contact_are_omitted() {
        let prompt = build_stage_prompt(&EmailPromptInput {
            deal_title: "Pilot".to_string(),
            stage: "Negotiation".to_string(),
            deal_value: Some(0.0),
            contact_name: Some("  ".to_string()),
        });
        assert!(prompt.starts_with("Generate a negotiation discussion email for the deal \"Pilot\". The email should:"));
    }

    #[test]
    fn test_fractional_value_keeps_decimals() {
        let mut with_cents = input("Qualified");
        with_cents.deal_value = Some(1234.5);
        assert!(build_stage_prompt(&with_cents).contains("worth $1234.5 has been qualified"));
    }

    #[test]
    fn test_generation_request_defaults() {
        let request = email_generation_request(&input("Lead"));
        assert_eq!(request.max_tokens, 500);
        assert_eq!(request.temperature, 0.7);
        assert!(request.system.starts_with("You are a professional sales communication expert."));
    }

    proptest! {
        #[test]
        fn prop_prompt_always_names_the_deal(title in "[A-Za-z ]{1,20}", stage in "[A-Za-z ]{1,12}") {
            let prompt = build_stage_prompt(&EmailPromptInput {
                deal_title: title.clone(),
                stage,
                deal_value: None,
                contact_name: None,
            });
            let quoted = format!("\"{}\"", title);
            prop_assert!(prompt.contains(&quoted));
            prop_assert!(!prompt.contains(" worth $"));
        }
    }
}
