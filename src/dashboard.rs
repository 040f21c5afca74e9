//! One-shot terminal view of the scoreboard and challenge list.

use crossterm::style::{Color, Stylize};

use crate::types::{ChallengeCatalogSnapshot, ScoreboardSnapshot};

const PURPLE: Color = Color::Rgb {
    r: 0x7D,
    g: 0x56,
    b: 0xF4,
};
const GREEN: Color = Color::Rgb {
    r: 0x73,
    g: 0xF5,
    b: 0x9F,
};
const RED: Color = Color::Rgb {
    r: 0xFF,
    g: 0x5F,
    b: 0x7A,
};

const SOLVED: &str = "✓";
const UNSOLVED: &str = "✗";

/// Shorten `s` to at most `max_len` characters, ending in `...` when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let keep = max_len.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Render both sections. `color` toggles ANSI styling.
pub fn render(
    scoreboard: &ScoreboardSnapshot,
    challenges: &ChallengeCatalogSnapshot,
    color: bool,
) -> String {
    let scoreboard_rows: Vec<Vec<String>> = scoreboard
        .data
        .iter()
        .map(|team| {
            let members: Vec<&str> = team.members.iter().map(|m| m.name.as_str()).collect();
            vec![
                team.rank.to_string(),
                truncate(&team.name, 24),
                team.score.to_string(),
                truncate(&members.join(", "), 39),
            ]
        })
        .collect();

    let challenge_rows: Vec<Vec<String>> = challenges
        .data
        .iter()
        .map(|c| {
            vec![
                c.id.to_string(),
                truncate(&c.name, 24),
                truncate(&c.category, 14),
                c.value.to_string(),
                c.solves.to_string(),
                if c.solved_by_me { SOLVED } else { UNSOLVED }.to_string(),
            ]
        })
        .collect();

    let mut out = String::from("\n");
    out.push_str(&title(
        &format!("CTFd Scoreboard [{}]", scoreboard.data.len()),
        color,
    ));
    out.push('\n');
    out.push_str(&table(
        &["Pos", "Team", "Score", "Members"],
        &scoreboard_rows,
        color,
    ));
    out.push_str("\n\n");
    out.push_str(&title(
        &format!("CTFd Challenges [{}]", challenges.data.len()),
        color,
    ));
    out.push('\n');
    out.push_str(&table(
        &["ID", "Name", "Category", "Value", "Solves", "Solved"],
        &challenge_rows,
        color,
    ));
    out.push('\n');
    out
}

fn title(text: &str, color: bool) -> String {
    if color {
        text.with(PURPLE).bold().to_string()
    } else {
        text.to_string()
    }
}

/// ASCII-bordered table. Widths are measured in characters before styling.
fn table(headers: &[&str], rows: &[Vec<String>], color: bool) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    out.push_str(&format!("{border}\n"));

    out.push('|');
    for (header, w) in headers.iter().zip(&widths) {
        let cell = center(header, *w);
        let cell = if color {
            cell.with(PURPLE).bold().to_string()
        } else {
            cell
        };
        out.push_str(&format!(" {cell} |"));
    }
    out.push('\n');
    out.push_str(&format!("{border}\n"));

    for row in rows {
        out.push('|');
        for (cell, w) in row.iter().zip(&widths) {
            let padded = format!("{cell}{}", " ".repeat(w - cell.chars().count()));
            let styled = match (color, cell.as_str()) {
                (true, SOLVED) => padded.with(GREEN).to_string(),
                (true, UNSOLVED) => padded.with(RED).to_string(),
                _ => padded,
            };
            out.push_str(&format!(" {styled} |"));
        }
        out.push('\n');
    }
    out.push_str(&border);
    out
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let total = width.saturating_sub(len);
    let left = total / 2;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(total - left))
}
