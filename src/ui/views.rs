use super::app::{App, Health, View};
use super::form::Field;
use crate::api::Direction;
use crate::format;
use crate::notify::Level;
use ratatui::{
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        block::Title, Block, Borders, Cell, Clear, HighlightSpacing, Paragraph, Row, Table,
        TableState, Tabs, Wrap,
    },
    Frame,
};
use unicode_width::UnicodeWidthStr;

const LABEL_WIDTH: usize = 16;

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(f.area());

    draw_tabs(f, app, chunks[0]);
    match app.current_view {
        View::Posting => draw_posting(f, app, chunks[1]),
        View::Accounts => draw_accounts(f, app, chunks[1]),
    }
    draw_status_bar(f, app, chunks[2]);
    draw_toasts(f, app, chunks[1]);
}

fn draw_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = View::all()
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let key = format!("[F{}] ", i + 1);
            let style = if *v == app.current_view {
                app.theme.focused()
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(key, Style::default().fg(app.theme.muted)),
                Span::styled(v.title(), style),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.primary))
                .title(" Core Banking General Ledger ")
                .title(
                    Title::from(Span::styled(
                        " System: FinScale v1.0 ",
                        Style::default().fg(app.theme.muted),
                    ))
                    .alignment(Alignment::Right),
                ),
        )
        .select(View::all().iter().position(|v| *v == app.current_view).unwrap_or(0));

    f.render_widget(tabs, area);
}

fn padded_label(label: &str) -> String {
    let pad = LABEL_WIDTH.saturating_sub(label.width());
    format!("{}{}", label, " ".repeat(pad))
}

fn draw_posting(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let theme = &app.theme;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .title(" Post Transaction ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(2), // Reference / type
            Constraint::Length(2), // Description
            Constraint::Length(1), // Divider
            Constraint::Min(3),    // Journal entries
            Constraint::Length(1), // Line hints
            Constraint::Length(3), // Submit + last result
        ])
        .split(inner);

    // Header: reference id and transaction type
    let header = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[0]);

    let mut reference = vec![
        Span::styled("  Reference ID    ", theme.label(false)),
        Span::styled(format!("# {}", form.reference_id), Style::default().fg(theme.muted)),
    ];
    if let Some(err) = form.error_for(Field::ReferenceId) {
        reference.push(Span::styled(format!("  {}", err), Style::default().fg(theme.error)));
    }
    f.render_widget(
        Paragraph::new(vec![
            Line::from(reference),
            Line::from(Span::styled("  (Idempotency Key)", Style::default().fg(theme.muted))),
        ]),
        header[0],
    );

    let type_focused = form.focus == Field::TxType;
    let type_value = if type_focused {
        format!("◀ {} ({}) ▶", form.tx_type.label(), form.tx_type.code())
    } else {
        format!("{} ({})", form.tx_type.label(), form.tx_type.code())
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(indicator(type_focused), theme.label(type_focused)),
            Span::styled("Transaction Type  ", theme.label(type_focused)),
            Span::styled(type_value, value_style(type_focused)),
        ]))
        .block(Block::default().borders(Borders::BOTTOM).border_style(theme.border(type_focused))),
        header[1],
    );

    // Description
    let desc_focused = form.focus == Field::Description;
    let desc_value = if form.description.is_empty() && !desc_focused {
        Span::styled("e.g. Monthly salary payment", Style::default().fg(theme.muted))
    } else {
        Span::styled(with_cursor(&form.description, desc_focused), value_style(desc_focused))
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(indicator(desc_focused), theme.label(desc_focused)),
            Span::styled(padded_label("Description"), theme.label(desc_focused)),
            desc_value,
        ]))
        .block(Block::default().borders(Borders::BOTTOM).border_style(theme.border(desc_focused))),
        chunks[1],
    );

    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "── Journal Entries ──────────────────────────────",
            Style::default().fg(theme.muted),
        ))),
        chunks[2],
    );

    draw_entries(f, app, chunks[3]);

    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("  Ctrl+A", Style::default().fg(Color::Cyan)),
            Span::styled(" Add Entry Line  ", Style::default().fg(theme.muted)),
            Span::styled("Ctrl+D", Style::default().fg(Color::Cyan)),
            Span::styled(" Remove Line  ", Style::default().fg(theme.muted)),
            Span::styled("D/C", Style::default().fg(Color::Cyan)),
            Span::styled(" Set Direction", Style::default().fg(theme.muted)),
        ])),
        chunks[4],
    );

    draw_submit(f, app, chunks[5]);
}

fn draw_entries(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let theme = &app.theme;

    if form.lines.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(
                "  No entry lines. Press Ctrl+A to add one.",
                Style::default().fg(theme.muted),
            )),
            area,
        );
        return;
    }

    let header = Row::new(vec![
        Cell::from("  Account Code"),
        Cell::from("Direction"),
        Cell::from("Amount"),
        Cell::from(""),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = form
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let account_focused = form.focus == Field::Account(i);
            let direction_focused = form.focus == Field::Direction(i);
            let amount_focused = form.focus == Field::Amount(i);
            let row_focused = account_focused || direction_focused || amount_focused;

            let account = if line.account_code.is_empty() && !account_focused {
                Span::styled("(e.g. 1001)", Style::default().fg(theme.muted))
            } else {
                Span::styled(with_cursor(&line.account_code, account_focused), value_style(account_focused))
            };

            let direction_text = match line.direction {
                Some(Direction::Debit) => "Debit (D)",
                Some(Direction::Credit) => "Credit (C)",
                None => "(select)",
            };
            let direction = if direction_focused {
                Span::styled(format!("◀ {} ▶", direction_text), value_style(true))
            } else {
                Span::styled(direction_text, value_style(false))
            };

            let amount = if line.amount.is_empty() && !amount_focused {
                Span::styled("¥ 0.00", Style::default().fg(theme.muted))
            } else {
                Span::styled(format!("¥ {}", with_cursor(&line.amount, amount_focused)), value_style(amount_focused))
            };

            let errors: Vec<&str> = [Field::Account(i), Field::Direction(i), Field::Amount(i)]
                .iter()
                .filter_map(|field| form.error_for(*field))
                .collect();

            Row::new(vec![
                Cell::from(Line::from(vec![
                    Span::styled(indicator(row_focused), theme.label(row_focused)),
                    account,
                ])),
                Cell::from(Line::from(direction)),
                Cell::from(Line::from(amount)),
                Cell::from(Span::styled(errors.join(", "), Style::default().fg(theme.error))),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Percentage(20),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ];

    // Selection follows the focused line so the table scrolls to it.
    let mut state = TableState::default().with_selected(form.focus.line());
    let table = Table::new(rows, widths)
        .header(header)
        .highlight_spacing(HighlightSpacing::Never);
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_submit(f: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let theme = &app.theme;

    let button = if form.is_submitting() {
        Line::from(Span::styled(
            "[ Posting... ]",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(vec![
            Span::styled(
                "[ Post Transaction ]",
                Style::default().fg(Color::White).bg(theme.primary).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Enter", Style::default().fg(theme.success)),
            Span::styled(" submit  ", Style::default().fg(theme.muted)),
            Span::styled("Esc", Style::default().fg(theme.error)),
            Span::styled(" clear", Style::default().fg(theme.muted)),
        ])
    };

    let mut lines = vec![button.alignment(Alignment::Center)];
    if let Some(ref posted) = form.last_posted {
        lines.push(Line::from(vec![
            Span::styled("✓ ", Style::default().fg(theme.success)),
            Span::styled(
                format!(
                    "Last posted TX #{} ({}) at {}",
                    posted.tx_id,
                    posted.reference_id,
                    format::format_posted_at(&posted.posted_at)
                ),
                Style::default().fg(theme.success),
            ),
        ]));
    }

    let widget = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(theme.muted)));
    f.render_widget(widget, area);
}

fn draw_accounts(f: &mut Frame, app: &mut App, area: Rect) {
    let accounts = app.cached_accounts();
    let theme = app.theme;

    let total = accounts.as_ref().map(|a| a.len()).unwrap_or(0);
    let title = format!(" Accounts ({}) ", total);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.primary))
        .title(title);

    let accounts = match accounts {
        Some(accounts) if !accounts.is_empty() => accounts,
        Some(_) => {
            let msg = Paragraph::new(Span::styled("  No accounts.", Style::default().fg(theme.muted)))
                .block(block);
            f.render_widget(msg, area);
            return;
        }
        None => {
            let text = if app.loading {
                Span::styled("  Loading accounts...", Style::default().fg(Color::Yellow))
            } else {
                Span::styled(
                    "  Accounts not loaded. Press r to retry.",
                    Style::default().fg(theme.muted),
                )
            };
            f.render_widget(Paragraph::new(text).block(block), area);
            return;
        }
    };

    let header = Row::new(vec![
        Cell::from("Code"),
        Cell::from("Name"),
        Cell::from("Type"),
        Cell::from(Line::from("Balance").alignment(Alignment::Right)),
    ])
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    .height(1)
    .bottom_margin(1);

    let rows: Vec<Row> = accounts
        .iter()
        .map(|acc| {
            let balance = format::format_balance(&acc.balance);
            let balance_style = if balance.negative {
                Style::default().fg(theme.error).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD)
            };

            Row::new(vec![
                Cell::from(Span::styled(
                    acc.account_code.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Cell::from(acc.name.clone()),
                Cell::from(Span::styled(
                    format::account_type_label(acc.account_type),
                    Style::default().fg(theme.account_type(acc.account_type)),
                )),
                Cell::from(
                    Line::from(Span::styled(
                        format!("{} {}", balance.text, acc.currency),
                        balance_style,
                    ))
                    .alignment(Alignment::Right),
                ),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(15),
        Constraint::Percentage(35),
        Constraint::Percentage(15),
        Constraint::Percentage(35),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().bg(Color::Blue))
        .highlight_symbol("▶ ");

    f.render_stateful_widget(table, area, &mut app.account_state);
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let help_text = if app.loading {
        " Loading...".to_string()
    } else if app.form.is_submitting() {
        " Submitting...".to_string()
    } else {
        match app.current_view {
            View::Posting => match app.form.focus {
                Field::TxType | Field::Direction(_) => {
                    " ←/→:Change  Tab/↓:Next  Enter:Post  Esc:Clear  F2:Accounts  Ctrl+C:Quit ".to_string()
                }
                _ => " Tab/↓:Next  Shift+Tab/↑:Prev  Enter:Post  Esc:Clear  F2:Accounts  Ctrl+C:Quit "
                    .to_string(),
            },
            View::Accounts => " ↑/↓:Select  r:Refresh  ←/→:Tabs  q:Quit ".to_string(),
        }
    };

    let chunks = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let help_style = if app.loading || app.form.is_submitting() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let help = Paragraph::new(Line::from(Span::styled(help_text, help_style)))
        .block(Block::default().borders(Borders::ALL).title(" Keys "));

    let (health, health_color) = match app.health {
        Health::Up => ("up", app.theme.success),
        Health::Down => ("down", app.theme.error),
        Health::Unknown => ("?", app.theme.muted),
    };
    let info = Paragraph::new(Line::from(vec![
        Span::styled(" API ", Style::default().fg(app.theme.muted)),
        Span::styled(health, Style::default().fg(health_color)),
        Span::styled(format!(" | {}", app.api.http().base_url()), Style::default().fg(app.theme.muted)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Backend "));

    f.render_widget(help, chunks[0]);
    f.render_widget(info, chunks[1]);
}

fn draw_toasts(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .toasts
        .visible()
        .map(|n| {
            let (mark, color) = match n.level {
                Level::Success => ("✓ ", app.theme.success),
                Level::Error => ("✗ ", app.theme.error),
            };
            Line::from(vec![
                Span::styled(mark, Style::default().fg(color)),
                Span::styled(n.text.clone(), Style::default().fg(color)),
            ])
        })
        .collect();

    if lines.is_empty() || area.width < 10 || area.height < 3 {
        return;
    }

    let width = area.width.min(60);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + area.width - width,
        y: area.y,
        width,
        height,
    };

    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(app.theme.primary))),
        popup,
    );
}

fn indicator(focused: bool) -> &'static str {
    if focused {
        "▶ "
    } else {
        "  "
    }
}

fn value_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    }
}

fn with_cursor(value: &str, focused: bool) -> String {
    if focused {
        format!("{}█", value)
    } else {
        value.to_string()
    }
}
