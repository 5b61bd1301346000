use chrono::{DateTime, NaiveDate, Utc};
use colored::Colorize;
use daynotes::autosave::SaveStatus;
use daynotes::dates::{day_string, format_long, format_time, relative_label};
use daynotes::model::{Note, Selection};
use daynotes::theme::AVAILABLE_THEMES;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const SELECTED_MARKER: &str = "▸";

pub(super) fn print_success(message: &str) {
    println!("{}", message.green());
}

pub(super) fn print_info(message: &str) {
    println!("{}", message.dimmed());
}

pub(super) fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

pub(super) fn print_status(status: SaveStatus) {
    let label = status.to_string();
    let colored = match status {
        SaveStatus::Saved => label.green(),
        SaveStatus::Saving => label.yellow(),
        SaveStatus::SyncedToCloud => label.cyan(),
        SaveStatus::SyncFailed => label.red(),
    };
    println!("{}", colored);
}

fn day_heading(date: NaiveDate, today: NaiveDate) -> String {
    format!(
        "{} {}",
        relative_label(date, today).bold(),
        format!("· {} ({})", format_long(date), day_string(date)).dimmed()
    )
}

pub(super) fn print_note(date: NaiveDate, note: Option<&Note>, today: NaiveDate) {
    println!("{}", day_heading(date, today));
    let Some(note) = note else {
        println!("{}", "No note selected.".dimmed());
        return;
    };
    println!(
        "{} {}",
        note.title.yellow().bold(),
        format!("[{}] updated {}", note.id, format_time(note.updated_at)).dimmed()
    );
    println!("--------------------------------");
    if note.content.is_empty() {
        println!("{}", "(empty)".dimmed());
    } else {
        println!("{}", note.content);
    }
}

pub(super) fn print_notes(
    date: NaiveDate,
    notes: &[Note],
    selection: &Selection,
    today: NaiveDate,
    now: DateTime<Utc>,
) {
    println!("{}", day_heading(date, today));
    if notes.is_empty() {
        println!("No notes on this day.");
        return;
    }

    for (i, note) in notes.iter().enumerate() {
        let selected = selection.is(date, &note.id);
        let left_prefix = if selected {
            format!("  {} ", SELECTED_MARKER)
        } else {
            "    ".to_string()
        };
        let idx_str = format!("{}. ", i + 1);
        let id_str = format!(" {}  ", note.id);

        let preview: String = note
            .content
            .chars()
            .take(50)
            .map(|c| if c == '\n' { ' ' } else { c })
            .collect();
        let title_content = if preview.is_empty() {
            note.title.clone()
        } else {
            format!("{} {}", note.title, preview)
        };

        let fixed_width = left_prefix.width() + idx_str.width() + id_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);
        let title_display = truncate_to_width(&title_content, available);
        let padding = available.saturating_sub(title_display.width());

        let idx_colored = if selected {
            idx_str.yellow()
        } else {
            idx_str.normal()
        };

        println!(
            "{}{}{}{}{}{}",
            left_prefix,
            idx_colored,
            title_display,
            " ".repeat(padding),
            id_str.dimmed(),
            format_time_ago(note.updated_at, now).dimmed()
        );
    }
}

pub(super) fn print_days(days: &[(NaiveDate, usize)], selected: NaiveDate, today: NaiveDate) {
    if days.is_empty() {
        println!("No notes yet.");
        return;
    }
    for (date, count) in days {
        let marker = if *date == selected {
            SELECTED_MARKER
        } else {
            " "
        };
        let noun = if *count == 1 { "note" } else { "notes" };
        println!(
            "  {} {}  {:<12} {}",
            marker.yellow(),
            day_string(*date),
            relative_label(*date, today),
            format!("{} {}", count, noun).dimmed()
        );
    }
}

pub(super) fn print_themes(current: &str) {
    for name in AVAILABLE_THEMES {
        if *name == current {
            println!("  {} {}", SELECTED_MARKER.yellow(), name.bold());
        } else {
            println!("    {}", name);
        }
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(timestamp);

    let formatter = Formatter::new();
    let time_str = formatter.convert(duration.to_std().unwrap_or_default());

    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
