// UI layer: reply rendering and the two invocation flows (one-shot and
// interactive loop), prompting with `dialoguer` where input is needed.

use crate::api::{ChatClient, ChatReply};
use anyhow::Result;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Resolve the server base URL. Precedence: `--base=` flag, then the
/// `SHOPLITE_API` env var, then an interactive prompt. Trailing slashes are
/// stripped so `<base>/chat` joins cleanly. The URL is not validated here;
/// a bad one fails at call time as a connection error.
pub fn resolve_base_url(flag: Option<&str>) -> Result<String> {
    let env = std::env::var("SHOPLITE_API").ok();
    let raw = match pick_base_url(flag, env.as_deref()) {
        Some(url) => url,
        None => Input::<String>::new()
            .with_prompt("Enter API base URL (e.g., https://<id>.ngrok-free.dev)")
            .interact_text()?,
    };
    Ok(raw.trim().trim_end_matches('/').to_string())
}

/// Pure precedence step: flag wins over env, blank values count as absent.
fn pick_base_url(flag: Option<&str>, env: Option<&str>) -> Option<String> {
    if let Some(f) = flag {
        if !f.trim().is_empty() {
            return Some(f.to_string());
        }
    }
    env.map(str::trim).filter(|e| !e.is_empty()).map(String::from)
}

/// True for the commands that end the interactive loop.
fn is_exit_command(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "/exit" | "exit" | "quit" | ":q")
}

/// Format a reply for the terminal. Kept separate from printing so the
/// layout is testable.
fn render_reply(reply: &ChatReply, debug: bool) -> String {
    let mut out = String::from("\n=== Reply ===\n");
    let ans = reply.answer.as_deref().unwrap_or("").trim();
    if ans.is_empty() {
        out.push_str("(no answer text)\n");
    } else {
        out.push_str(ans);
        out.push('\n');
    }
    match &reply.sources {
        Some(serde_json::Value::Array(items)) => {
            let joined = items
                .iter()
                .map(|s| match s {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            out.push_str(&format!("Sources: {}\n", joined));
        }
        Some(serde_json::Value::Null) | None => out.push_str("Sources: \n"),
        Some(serde_json::Value::String(s)) => out.push_str(&format!("Sources: {}\n", s)),
        Some(other) => out.push_str(&format!("Sources: {}\n", other)),
    }
    if let Some(conf) = &reply.confidence {
        out.push_str(&format!("Confidence: {}\n", conf));
    }
    if debug {
        if let Some(payload) = &reply.debug {
            let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string());
            out.push_str(&format!("\n[debug] {}\n", pretty));
        }
    }
    out
}

/// Send one question with a spinner and print the rendered reply.
fn ask_and_print(api: &ChatClient, question: &str) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").unwrap());
    spinner.set_message("Waiting for reply...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let result = api.send_query(question);
    spinner.finish_and_clear();
    print!("{}", render_reply(&result?, api.debug_enabled()));
    Ok(())
}

/// One-shot mode: a single question from the command line, one request,
/// one reply, then exit. An empty question is a usage error.
pub fn run_once(api: &ChatClient, question: &str) -> Result<()> {
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("Provide a question, e.g.:\n  shoplite-cli \"What is the return window?\"");
    }
    ask_and_print(api, question)
}

/// Interactive loop: prompt until an exit command, EOF or interrupt.
/// Errors from a single turn are printed and the loop keeps going, so one
/// bad request does not end the conversation.
pub fn run_loop(api: &ChatClient) -> Result<()> {
    println!("(Connected to {})", api.base_url());
    println!("(session_id={})  Type /exit to quit.", api.session_id());
    loop {
        // `interact_text` errors on EOF or interrupt; treat both as a
        // graceful end of the conversation.
        let line = match Input::<String>::new()
            .with_prompt("\nYou")
            .allow_empty(true)
            .interact_text()
        {
            Ok(line) => line,
            Err(_) => {
                println!("\nBye!");
                break;
            }
        };
        let q = line.trim();
        if q.is_empty() {
            continue;
        }
        if is_exit_command(q) {
            println!("Bye!");
            break;
        }
        if let Err(e) = ask_and_print(api, q) {
            println!("[client] Error: {:#}", e);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(v: serde_json::Value) -> ChatReply {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn flag_beats_env() {
        let picked = pick_base_url(Some("http://flag"), Some("http://env"));
        assert_eq!(picked.as_deref(), Some("http://flag"));
    }

    #[test]
    fn env_used_when_flag_absent_or_blank() {
        assert_eq!(pick_base_url(None, Some("http://env")).as_deref(), Some("http://env"));
        assert_eq!(pick_base_url(Some("  "), Some("http://env")).as_deref(), Some("http://env"));
    }

    #[test]
    fn prompt_needed_when_nothing_set() {
        assert_eq!(pick_base_url(None, None), None);
        assert_eq!(pick_base_url(None, Some("")), None);
    }

    #[test]
    fn exit_commands_are_case_insensitive() {
        for cmd in ["/exit", "exit", "quit", ":q", "/EXIT", "Quit", ":Q"] {
            assert!(is_exit_command(cmd), "{} should exit", cmd);
        }
        assert!(!is_exit_command("/quit"));
        assert!(!is_exit_command("exit now"));
    }

    #[test]
    fn empty_answer_renders_placeholder() {
        let out = render_reply(&reply(json!({})), false);
        assert!(out.contains("=== Reply ==="));
        assert!(out.contains("(no answer text)"));
        let out = render_reply(&reply(json!({"answer": "   "})), false);
        assert!(out.contains("(no answer text)"));
    }

    #[test]
    fn sources_list_is_joined() {
        let out = render_reply(&reply(json!({"answer": "a", "sources": ["x.md", "y.md"]})), false);
        assert!(out.contains("Sources: x.md; y.md"));
    }

    #[test]
    fn missing_sources_render_empty() {
        let out = render_reply(&reply(json!({"answer": "a"})), false);
        assert!(out.contains("Sources: \n"));
    }

    #[test]
    fn non_list_sources_render_as_is() {
        let out = render_reply(&reply(json!({"answer": "a", "sources": "catalog"})), false);
        assert!(out.contains("Sources: catalog"));
    }

    #[test]
    fn confidence_line_only_when_present() {
        let with = render_reply(&reply(json!({"answer": "a", "confidence": 0.7})), false);
        assert!(with.contains("Confidence: 0.7"));
        let without = render_reply(&reply(json!({"answer": "a"})), false);
        assert!(!without.contains("Confidence"));
    }

    #[test]
    fn debug_dump_requires_debug_mode_and_payload() {
        let body = json!({"answer": "a", "debug": {"hits": 2}});
        assert!(render_reply(&reply(body.clone()), true).contains("[debug]"));
        assert!(!render_reply(&reply(body), false).contains("[debug]"));
        assert!(!render_reply(&reply(json!({"answer": "a"})), true).contains("[debug]"));
    }
}
