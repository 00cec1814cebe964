//! The `interviewkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("interviewkit.toml").exists() {
        println!("interviewkit.toml already exists, skipping.");
    } else {
        std::fs::write("interviewkit.toml", SAMPLE_CONFIG)?;
        println!("Created interviewkit.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Set INTERVIEWKIT_OPENAI_KEY (or edit interviewkit.toml) to enable voice");
    println!("  2. Run: interviewkit validate --bank banks/example.toml");
    println!("  3. Run: interviewkit run --role frontend --level mid --bank banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# interviewkit configuration

# question_bank = "banks"
# usage_file = ".interviewkit/usage.json"

[voice]
enabled = true
api_key = "${OPENAI_API_KEY}"
voice = "alloy"
tts_model = "tts-1-hd"
speed = 1.15
transcription_model = "whisper-1"
recording_format = "wav"

[voice.recorder]
command = "sox"
args = ["-q", "-d", "-c", "1", "-r", "16000", "{file}"]

[limits]
daily_limit = 3

[timing]
intro_settle_ms = 2000
feedback_settle_ms = 2000
first_question_delay_ms = 4000
next_question_delay_ms = 500
narration_timeout_ms = 90000
transcription_timeout_ms = 30000
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Question Bank"

[[questions]]
role = "frontend"
id = "ex-fe-1"
category = "technical"
difficulty = "easy"
prompt = "What is the virtual DOM and why do frameworks use it?"
hints = ["Diffing", "Batching updates"]
expected_keywords = ["virtual DOM", "diff", "render", "performance"]
follow_up = "When can the virtual DOM be slower than direct updates?"

[[questions]]
role = "frontend"
id = "ex-fe-2"
category = "coding"
difficulty = "medium"
prompt = "Write a function that deep-clones a plain JavaScript object."
hints = ["Recursion", "Arrays vs objects"]
expected_keywords = ["recursion", "array", "object", "reference"]

[[questions]]
role = "backend"
id = "ex-be-1"
category = "system-design"
difficulty = "hard"
prompt = "Design a rate limiter for a public HTTP API."
hints = ["Token bucket", "Distributed state"]
expected_keywords = ["token bucket", "Redis", "sliding window", "429"]
"#;
