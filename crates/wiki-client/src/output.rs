use std::io::{self, BufRead, IsTerminal, Write};

use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use wiki_client::Dashboard;
use wiki_shared::{markdown, Document, User};

fn date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn date_time(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn print_user(user: &User) {
    println!("{} <{}> [{}]", user.name, user.email, user.role);
}

pub fn print_listing(dashboard: &Dashboard) {
    if !dashboard.is_loaded() {
        println!("Documents are still loading.");
        return;
    }

    let visible = dashboard.visible_documents();
    if visible.is_empty() {
        if dashboard.search_query().is_empty() {
            println!("No documents yet.");
        } else {
            println!("No documents match '{}'.", dashboard.search_query());
        }
        return;
    }

    let selected = dashboard.selected().map(|d| d.id.as_str());
    for doc in visible {
        let marker = if Some(doc.id.as_str()) == selected { '>' } else { ' ' };
        let deletable = if dashboard.can_delete(doc) { " *" } else { "" };
        println!(
            "{} {:>5}  {:<40} {}  {}{}",
            marker,
            doc.id,
            doc.title,
            date(doc.updated_at),
            doc.owner_name,
            deletable
        );
    }

    if !dashboard.can_create() {
        println!("(viewers cannot create documents)");
    }
}

pub fn print_document(doc: &Document, html: bool) {
    println!("# {}  [{}]", doc.title, doc.id);
    let mut byline = format!("By {}", doc.owner_name);
    if let Some(editor) = doc.last_edited_by.as_deref().filter(|e| !e.is_empty()) {
        byline.push_str(&format!(", last edited by {}", editor));
    }
    println!("{} on {}", byline, date_time(doc.updated_at));
    println!();

    if html {
        println!("{}", markdown::to_html(&doc.content));
    } else {
        println!("{}", doc.content);
    }
}

pub fn print_history(doc: &Document, can_restore: bool) {
    println!("History of '{}':", doc.title);
    for (i, rev) in doc.history().enumerate() {
        let current = if i == 0 { " (Current)" } else { "" };
        println!("  [{}] {}{}", rev.id, rev.changes, current);
        println!("        {} - {}", rev.author_name, date_time(rev.created_at));
        if i != 0 && can_restore {
            println!("        restore with: {}", rev.id);
        }
    }
}

/// Read one trimmed line from stdin after printing `prompt`
pub fn ask(prompt: &str) -> io::Result<String> {
    print!("{} ", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Like [`ask`], but the typed text is shown as `*`. Falls back to a plain
/// line read when stdin is not a terminal.
pub fn ask_secret(prompt: &str) -> io::Result<String> {
    if !io::stdin().is_terminal() {
        return ask(prompt);
    }

    print!("{} ", prompt);
    io::stdout().flush()?;

    enable_raw_mode()?;
    let secret = read_masked();
    disable_raw_mode()?;
    println!();
    secret
}

/// What a key press does to a masked entry
#[derive(Debug, PartialEq, Eq)]
enum MaskedKey {
    Done,
    Cancel,
    Echo(&'static str),
    Ignore,
}

fn masked_key(secret: &mut String, key: KeyEvent) -> MaskedKey {
    if key.kind != KeyEventKind::Press {
        return MaskedKey::Ignore;
    }

    match key.code {
        KeyCode::Enter => MaskedKey::Done,
        KeyCode::Esc => MaskedKey::Cancel,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => MaskedKey::Cancel,
        KeyCode::Char(c) => {
            secret.push(c);
            MaskedKey::Echo("*")
        }
        KeyCode::Backspace if secret.pop().is_some() => MaskedKey::Echo("\x08 \x08"),
        _ => MaskedKey::Ignore,
    }
}

fn read_masked() -> io::Result<String> {
    let mut secret = String::new();
    let mut stdout = io::stdout();

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        match masked_key(&mut secret, key) {
            MaskedKey::Done => return Ok(secret),
            MaskedKey::Cancel => return Err(io::ErrorKind::Interrupted.into()),
            MaskedKey::Echo(text) => {
                write!(stdout, "{}", text)?;
                stdout.flush()?;
            }
            MaskedKey::Ignore => {}
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// y/N question on stdin; anything but yes declines
pub fn ask_yes_no(prompt: &str) -> bool {
    ask(&format!("{} [y/N]", prompt))
        .map(|answer| is_yes(&answer))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn masked_entry_echoes_stars_only() {
        let mut secret = String::new();

        assert_eq!(masked_key(&mut secret, press(KeyCode::Char('p'))), MaskedKey::Echo("*"));
        assert_eq!(masked_key(&mut secret, press(KeyCode::Char('w'))), MaskedKey::Echo("*"));
        assert_eq!(
            masked_key(&mut secret, press(KeyCode::Backspace)),
            MaskedKey::Echo("\x08 \x08")
        );
        assert_eq!(masked_key(&mut secret, press(KeyCode::Enter)), MaskedKey::Done);
        assert_eq!(secret, "p");
    }

    #[test]
    fn backspace_on_empty_entry_does_nothing() {
        let mut secret = String::new();
        assert_eq!(masked_key(&mut secret, press(KeyCode::Backspace)), MaskedKey::Ignore);
    }

    #[test]
    fn ctrl_c_and_escape_cancel() {
        let mut secret = String::new();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);

        assert_eq!(masked_key(&mut secret, ctrl_c), MaskedKey::Cancel);
        assert_eq!(masked_key(&mut secret, press(KeyCode::Esc)), MaskedKey::Cancel);
        assert!(secret.is_empty());
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes(" Y "));
        assert!(is_yes("yes"));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
