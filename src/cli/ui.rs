use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;

use crate::cli::state::{self, App, EditField};
use crate::cli::util::{fmt_money, iso};
use crate::database::models::{Category, DateRange, PaymentMode};

pub fn draw(f: &mut Frame, app: &mut App) {
    let size = f.area();

    // top tabs | main content | bottom status bar
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(1)])
        .split(size);

    let titles = ["Expenses", "Add Expense", "Analytics", "Help"]
        .into_iter()
        .map(|t| Line::from(Span::raw(t)))
        .collect::<Vec<_>>();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .block(Block::default().borders(Borders::ALL).title("Expense Tracker"))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(tabs, root[0]);

    match app.tab {
        state::Tab::Expenses => draw_expenses(f, root[1], app),
        state::Tab::AddExpense => draw_add_expense(f, root[1], app),
        state::Tab::Analytics => draw_analytics(f, root[1], app),
        state::Tab::Help => draw_help(f, root[1]),
    }

    f.render_widget(Paragraph::new(app.status.as_str()), root[2]);
}

fn category_color(c: Category) -> Color {
    match c {
        Category::Rental => Color::Rgb(0x88, 0x84, 0xd8),
        Category::Groceries => Color::Rgb(0x82, 0xca, 0x9d),
        Category::Entertainment => Color::Rgb(0xff, 0xc6, 0x58),
        Category::Travel => Color::Rgb(0xff, 0x80, 0x42),
        Category::Others => Color::Rgb(0xa4, 0xde, 0x6c),
    }
}

fn checkbox(on: bool) -> &'static str {
    if on { "[x]" } else { "[ ]" }
}

// Expenses Page

fn draw_expenses(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    let filters = &app.expenses.filters;
    let ranges = DateRange::ALL
        .iter()
        .map(|r| if *r == filters.date_range { format!("<{}>", r.label()) } else { r.label().to_string() })
        .collect::<Vec<_>>()
        .join("  ");
    let cats = Category::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}{} {}", i + 1, checkbox(filters.categories.contains(c)), c))
        .collect::<Vec<_>>()
        .join("  ");
    let modes = PaymentMode::ALL
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{}{} {}", i + 6, checkbox(filters.payment_modes.contains(m)), m))
        .collect::<Vec<_>>()
        .join("  ");

    let bar = Paragraph::new(vec![
        Line::from(format!("Date Range (d): {}", ranges)),
        Line::from(format!("Category       : {}", cats)),
        Line::from(format!("Payment Mode   : {}", modes)),
    ])
    .block(Block::default().borders(Borders::ALL).title("Filters  (c=clear, r=refresh, a=add)"));
    f.render_widget(bar, chunks[0]);

    let title = if app.expenses.loading { "Expenses (loading…)" } else { "Expenses" };
    if app.expenses.list.is_empty() {
        let p = Paragraph::new("No expenses found.")
            .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(p, chunks[1]);
        return;
    }

    let header = Row::new(vec!["Amount (₹)", "Category", "Notes", "Date", "Payment Mode"]).height(1);
    let body: Vec<Row> = app
        .expenses
        .list
        .iter()
        .map(|e| {
            Row::new(vec![
                Cell::from(fmt_money(&e.amount)),
                Cell::from(e.category.as_str()).style(Style::default().fg(category_color(e.category))),
                Cell::from(e.notes.clone().unwrap_or_else(|| "-".into())),
                Cell::from(iso(&e.date)),
                Cell::from(e.payment_mode.as_str()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Percentage(50),
        Constraint::Length(12),
        Constraint::Length(14),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    f.render_stateful_widget(table, chunks[1], &mut app.expenses.tsel);
}

// Add Expense Page

fn draw_add_expense(f: &mut Frame, area: Rect, app: &App) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let form = &app.add;
    let mark = |field: EditField| if form.editing == Some(field) { "  <editing>" } else { "" };

    let form_lines = vec![
        format!("Amount (₹)   : {}{}", form.amount, mark(EditField::Amount)),
        format!(
            "Category     : {}",
            form.category.map(|c| c.as_str()).unwrap_or("Select Category")
        ),
        format!("Notes        : {}{}", form.notes, mark(EditField::Notes)),
        format!("Date         : {}{}", form.date, mark(EditField::Date)),
        format!(
            "Payment Mode : {}",
            form.payment_mode.map(|m| m.as_str()).unwrap_or("Payment Mode")
        ),
    ]
    .join("\n");

    let form_p = Paragraph::new(form_lines)
        .block(Block::default().borders(Borders::ALL).title("Add Expense"));
    f.render_widget(form_p, cols[0]);

    let help_lines = vec![
        "Fields:".to_string(),
        "  a/n/d: Edit Amount/Notes/Date".into(),
        "  Tab  : Next field while editing".into(),
        "  Enter/Esc: Stop editing".into(),
        "  c/p  : Cycle Category/Payment Mode".into(),
        "Actions:".into(),
        "  s: Save | Esc: Back".into(),
        String::new(),
        if let Some(err) = &form.error {
            format!("Error: {}", err)
        } else if let Some(ok) = &form.success {
            format!("Success: {}", ok)
        } else {
            String::new()
        },
    ]
    .join("\n");

    let help_p = Paragraph::new(help_lines)
        .block(Block::default().borders(Borders::ALL).title("Help & Status"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_p, cols[1]);
}

// Analytics Page

/// Rows of the totals table plus header and borders.
fn totals_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(3)
}

fn draw_analytics(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Analytics: Monthly Category-wise  (r=refresh)");

    if app.analytics.series.is_empty() {
        f.render_widget(Paragraph::new("No analytics data available.").block(block), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(totals_height(app.analytics.series.len()))])
        .split(area);

    let bars: Vec<(String, Vec<Bar>)> = app
        .analytics
        .series
        .iter()
        .map(|point| {
            let bars = point
                .totals()
                .iter()
                .map(|(c, total)| {
                    Bar::default()
                        .value(total.round().to_u64().unwrap_or(0))
                        .text_value(String::new())
                        .style(Style::default().fg(category_color(*c)))
                })
                .collect();
            (point.label(), bars)
        })
        .collect();

    let mut chart = BarChart::default().block(block).bar_width(3).bar_gap(0).group_gap(3);
    for (label, group) in &bars {
        chart = chart.data(BarGroup::default().label(Line::from(label.as_str())).bars(group));
    }
    f.render_widget(chart, chunks[0]);

    let mut header = vec![Cell::from("Month")];
    header.extend(
        Category::ALL
            .iter()
            .map(|c| Cell::from(c.as_str()).style(Style::default().fg(category_color(*c)))),
    );
    header.push(Cell::from("Total"));

    let rows: Vec<Row> = app
        .analytics
        .series
        .iter()
        .map(|point| {
            let mut cells = vec![Cell::from(point.label())];
            cells.extend(point.totals().iter().map(|(_, v)| Cell::from(fmt_money(v))));
            cells.push(Cell::from(fmt_money(&point.total())));
            Row::new(cells)
        })
        .collect();

    let widths = vec![Constraint::Length(10); Category::ALL.len() + 2];
    let table = Table::new(rows, widths)
        .header(Row::new(header))
        .block(Block::default().borders(Borders::ALL).title("Totals"));
    f.render_widget(table, chunks[1]);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let help_text = vec![
        "Global Keys:",
        "  q          : Quit App",
        "  ?          : Show this Help tab",
        "  Tab        : Next tab (Shift+Tab: previous)",
        "",
        "Expenses Tab:",
        "  Up/Down    : Navigate list",
        "  d          : Cycle date range",
        "  1-5        : Toggle Rental/Groceries/Entertainment/Travel/Others",
        "  6-9        : Toggle UPI/Credit Card/Net Banking/Cash",
        "  c          : Clear all filters",
        "  r          : Refresh list",
        "  a          : Add new expense",
        "",
        "Add Expense Tab:",
        "  a/n/d      : Edit Amount/Notes/Date (Enter/Esc to stop)",
        "  c/p        : Cycle Category/Payment Mode",
        "  s          : Save expense",
        "  Esc/b      : Back to Expenses",
        "",
        "Analytics Tab:",
        "  r          : Refresh (always covers all expenses, ignores filters)",
    ]
    .join("\n");

    let p = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("Help & Keybindings"));

    f.render_widget(p, area);
}
