//! Plain-text views. Everything here is pure so it can be tested without a terminal.

use crate::api::{ApiKeyItem, ChatMessage, ChatRole, ContactItem, PromptItem, TargetMode};
use crate::manage::mask_key;
use crate::monitor::{ActivityEntry, ActivityLevel};
use crate::stats::{StatsReport, StatsSummary};
use crate::status::{PairingView, StatusSnapshot};
use std::fmt::Write;

const RULE_WIDTH: usize = 60;

fn rule() -> String {
    "-".repeat(RULE_WIDTH)
}

fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}

pub fn status_card(snapshot: &StatusSnapshot, session_id: &str, loading: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n  WA-BOT-AI  [{}]", snapshot.system_label());
    let _ = writeln!(out, "  {}", rule());
    let _ = writeln!(out, "  Session:   {}", session_id);
    if loading {
        let _ = writeln!(out, "  Status:    loading...");
        return out;
    }
    let _ = writeln!(out, "  Status:    {}", snapshot.status);
    let _ = writeln!(
        out,
        "  Connected: {}",
        if snapshot.is_connected { "yes" } else { "no" }
    );
    if let Some(phone) = &snapshot.phone_number {
        let _ = writeln!(out, "  Phone:     {}", phone);
    }
    out
}

pub fn pairing_panel(view: &PairingView) -> String {
    match view {
        PairingView::Pairing(Some(_)) => "\n  Scan to pair: WhatsApp > Settings > Linked Devices > Link a Device.\n  \
             Save the code with `status --qr-out qr.png` and open it.\n"
            .to_string(),
        PairingView::Pairing(None) => "\n  Pairing code requested, waiting for the image...\n".to_string(),
        PairingView::Connected(phone) => format!(
            "\n  Linked to {}. The AI is answering messages.\n",
            phone.as_deref().unwrap_or("an unknown number")
        ),
        PairingView::Idle => "\n  No active session. Run `init` to start the bot.\n".to_string(),
    }
}

pub fn stats_board(report: &StatsReport, summary: &StatsSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n  Users: {}   Messages: {}   Active today: {}",
        summary.total_users, summary.total_messages, summary.active_today
    );
    let _ = writeln!(
        out,
        "  Requests: {}   Responses: {}",
        report.global.requests, report.global.responses
    );

    let chats = report.by_recent_activity();
    if chats.is_empty() {
        let _ = writeln!(out, "\n  No conversations yet.");
        return out;
    }

    let _ = writeln!(out, "\n  Recent chats\n  {}", rule());
    for chat in chats {
        let name = if chat.push_name.is_empty() {
            chat.jid.split('@').next().unwrap_or(&chat.jid)
        } else {
            chat.push_name.as_str()
        };
        let last = chat
            .last_active
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "  {:<24} {:>6} msgs  {}", truncate(name, 24), chat.msg_count, last);
    }
    out
}

pub fn transcript(jid: &str, messages: &[ChatMessage]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n  Chat with {}\n  {}", jid, rule());
    if messages.is_empty() {
        let _ = writeln!(out, "  No messages.");
        return out;
    }
    for message in messages {
        let who = match message.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "bot ",
        };
        let time = message
            .timestamp
            .map(|at| at.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string());
        let latency = message
            .latency
            .map(|ms| format!(" ({:.1}s)", ms as f64 / 1000.0))
            .unwrap_or_default();
        let _ = writeln!(out, "  {} {} | {}{}", time, who, message.content, latency);
    }
    out
}

pub fn prompt_table(prompts: &[PromptItem]) -> String {
    if prompts.is_empty() {
        return "\nNo personas. Add one with `prompts add`.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "\nPersonas ({})\n{}", prompts.len(), rule());
    for prompt in prompts {
        let marker = if prompt.is_active { "*" } else { " " };
        let _ = writeln!(
            out,
            "{} {:<10} {:<20} {}",
            marker,
            prompt.id,
            truncate(&prompt.name, 20),
            truncate(&prompt.content, 40)
        );
    }
    out
}

pub fn key_table(keys: &[ApiKeyItem], reveal: bool) -> String {
    if keys.is_empty() {
        return "\nNo API keys. Add one with `keys add`.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "\nAPI keys ({})\n{}", keys.len(), rule());
    for key in keys {
        let marker = if key.is_active { "*" } else { " " };
        let value = if reveal {
            key.key_value.clone()
        } else {
            mask_key(&key.key_value)
        };
        let _ = writeln!(out, "{} {:<10} {:<20} {}", marker, key.id, truncate(&key.name, 20), value);
    }
    out
}

pub fn contact_table(contacts: &[ContactItem], mode: TargetMode) -> String {
    let mut out = String::new();
    let scope = match mode {
        TargetMode::All => "replying to everyone",
        TargetMode::Specific => "replying to listed contacts only",
    };
    let _ = writeln!(out, "\nTarget mode: {} ({})", mode, scope);
    if contacts.is_empty() {
        let _ = writeln!(out, "No contacts.");
        return out;
    }
    let _ = writeln!(out, "{}", rule());
    for contact in contacts {
        let _ = writeln!(out, "  {:<24} {}", truncate(contact.display_name(), 24), contact.jid);
    }
    out
}

pub fn activity_line(entry: &ActivityEntry) -> String {
    let tag = match entry.level {
        ActivityLevel::Info => "INFO",
        ActivityLevel::Warn => "WARN",
    };
    format!("[{}] {} {}", entry.at.format("%H:%M:%S"), tag, entry.message)
}
