//! Fixed lines the interviewer speaks.

/// Spoken when the interview starts.
pub const INTRO: &str =
    "Hi! I'm Alex, your AI interviewer. Let's get started with your technical interview!";

/// Spoken when the last answer has been scored.
pub const COMPLETION: &str = "Congratulations! You've completed the interview. You did a great job today! Let me show you your detailed results and feedback.";

/// Spoken when the daily quota is used up.
pub fn paywall(limit: u32) -> String {
    format!(
        "I'm sorry, but you've used all {limit} of your free interviews for today. To continue practicing, please upgrade to premium for unlimited interviews!"
    )
}

/// Short spoken reaction to a scored answer.
pub fn spoken_feedback(score: u32, is_last: bool) -> &'static str {
    match (score, is_last) {
        (85.., true) => "That was fantastic! You really nailed the key concepts there. Excellent work on this final question!",
        (85.., false) => "That was fantastic! You really nailed the key concepts there. I'm impressed with your depth of knowledge.",
        (70.., _) => "Nice work! You covered the important points well. That shows solid understanding.",
        (_, true) => "Thanks for your answer. There's definitely room to expand on some of those concepts.",
        (_, false) => "Thanks for your answer. There's definitely room to expand on some of those concepts. Let's keep going!",
    }
}
