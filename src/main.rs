// Entrypoint for the CLI application.
// - Keeps `main` small: parse argv, resolve configuration, dispatch.
// - Returns `anyhow::Result` so one-shot failures exit non-zero with the
//   error message; the interactive loop handles its own per-turn errors.

use shoplite_cli::{api::ChatClient, ui};

fn main() -> anyhow::Result<()> {
    // `--base=<url>` is the only flag; every other argument is a question
    // word. Question words present means one-shot mode.
    let mut base_flag = None;
    let mut question_words = Vec::new();
    for arg in std::env::args().skip(1) {
        if let Some(url) = arg.strip_prefix("--base=") {
            base_flag = Some(url.trim().to_string());
        } else {
            question_words.push(arg);
        }
    }

    let base_url = ui::resolve_base_url(base_flag.as_deref())?;
    let api = ChatClient::from_env(base_url)?;

    if question_words.is_empty() {
        ui::run_loop(&api)
    } else {
        ui::run_once(&api, &question_words.join(" "))
    }
}
