// src/cli/state.rs
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::widgets::TableState;
use tracing::warn;

use crate::cli::api::Client;
use crate::cli::util::{iso, parse_date, parse_money};
use crate::database::models::expense::MAX_NOTES_LEN;
use crate::database::models::{Category, Expense, NewExpense, PaymentMode};
use crate::query::aggregate::MonthlyBreakdown;
use crate::query::filter::{self, FilterSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Expenses,
    AddExpense,
    Analytics,
    Help,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Expenses, Tab::AddExpense, Tab::Analytics, Tab::Help];

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn shift(&self, delta: isize) -> Tab {
        let n = Tab::ALL.len() as isize;
        Tab::ALL[(self.index() as isize + delta).rem_euclid(n) as usize]
    }
}

/// `1`..`5` toggle categories in chart order.
pub fn category_hotkey(c: char) -> Option<Category> {
    let idx = c.to_digit(10)?.checked_sub(1)? as usize;
    Category::ALL.get(idx).copied()
}

/// `6`..`9` toggle payment modes.
pub fn payment_hotkey(c: char) -> Option<PaymentMode> {
    let idx = c.to_digit(10)?.checked_sub(6)? as usize;
    PaymentMode::ALL.get(idx).copied()
}

#[derive(Default)]
pub struct ExpensesPage {
    pub filters: FilterSelection,
    pub list: Vec<Expense>,
    pub tsel: TableState,
    pub loading: bool,
}

#[derive(Default)]
pub struct AnalyticsPage {
    pub series: Vec<MonthlyBreakdown>,
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Amount,
    Notes,
    Date,
}

impl EditField {
    fn next(self) -> EditField {
        match self {
            EditField::Amount => EditField::Notes,
            EditField::Notes => EditField::Date,
            EditField::Date => EditField::Amount,
        }
    }

    fn prev(self) -> EditField {
        match self {
            EditField::Amount => EditField::Date,
            EditField::Date => EditField::Notes,
            EditField::Notes => EditField::Amount,
        }
    }
}

#[derive(Default, Clone)]
pub struct AddExpenseForm {
    pub amount: String,
    pub category: Option<Category>,
    pub notes: String,
    pub date: String,
    pub payment_mode: Option<PaymentMode>,
    pub editing: Option<EditField>,
    pub error: Option<String>,
    pub success: Option<String>,
}

fn cycle<T: Copy + PartialEq>(all: &[T], cur: Option<T>) -> Option<T> {
    match cur.and_then(|c| all.iter().position(|x| *x == c)) {
        Some(i) => all.get((i + 1) % all.len()).copied(),
        None => all.first().copied(),
    }
}

impl AddExpenseForm {
    pub fn blank() -> Self {
        Self {
            date: iso(&filter::today()),
            ..Default::default()
        }
    }

    pub fn cycle_category(&mut self) {
        self.category = cycle(&Category::ALL, self.category);
    }

    pub fn cycle_payment_mode(&mut self) {
        self.payment_mode = cycle(&PaymentMode::ALL, self.payment_mode);
    }

    /// Check the form and build the request. The error is shown as-is.
    pub fn to_request(&self) -> Result<NewExpense, String> {
        if self.amount.trim().is_empty() {
            return Err("Amount is required".into());
        }
        let amount = parse_money(&self.amount).ok_or("Invalid amount format")?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err("Amount cannot be negative".into());
        }
        let category = self.category.ok_or("Category is required")?;
        let date = parse_date(&self.date).ok_or("Date format: YYYY-MM-DD")?;
        let payment_mode = self.payment_mode.ok_or("Payment mode is required")?;
        let notes = self.notes.trim();

        Ok(NewExpense {
            amount,
            category,
            notes: if notes.is_empty() { None } else { Some(notes.to_string()) },
            date,
            payment_mode,
        })
    }

    fn field_mut(&mut self, field: EditField) -> &mut String {
        match field {
            EditField::Amount => &mut self.amount,
            EditField::Notes => &mut self.notes,
            EditField::Date => &mut self.date,
        }
    }
}

pub struct App {
    pub api: Client,
    pub tab: Tab,
    pub status: String,
    pub quit: bool,
    pub expenses: ExpensesPage,
    pub add: AddExpenseForm,
    pub analytics: AnalyticsPage,
}

impl App {
    pub fn new(api: Client) -> Self {
        Self {
            api,
            tab: Tab::Expenses,
            status: "Press ? for help | q to quit".into(),
            quit: false,
            expenses: ExpensesPage::default(),
            add: AddExpenseForm::blank(),
            analytics: AnalyticsPage::default(),
        }
    }

    pub async fn refresh_expenses(&mut self) -> anyhow::Result<()> {
        self.expenses.loading = true;
        let rows = self.api.list_expenses(&self.expenses.filters).await;
        self.expenses.loading = false;

        self.expenses.list = rows?;
        let n = self.expenses.list.len();
        match self.expenses.tsel.selected() {
            _ if n == 0 => self.expenses.tsel.select(None),
            Some(i) if i >= n => self.expenses.tsel.select(Some(n - 1)),
            None => self.expenses.tsel.select(Some(0)),
            _ => {}
        }
        Ok(())
    }

    pub async fn refresh_analytics(&mut self) -> anyhow::Result<()> {
        self.analytics.loading = true;
        let series = self.api.analytics().await;
        self.analytics.loading = false;

        self.analytics.series = series?;
        Ok(())
    }

    /// Reload after a filter change, keeping errors in the status bar.
    async fn filters_changed(&mut self) {
        if let Err(e) = self.refresh_expenses().await {
            warn!(error = %e, "listing refresh failed");
            self.status = format!("Error fetching expenses: {e}");
        }
    }

    fn move_row(&mut self, delta: isize) {
        let n = self.expenses.list.len();
        if n == 0 {
            self.expenses.tsel.select(None);
            return;
        }
        let cur = self.expenses.tsel.selected().unwrap_or(0) as isize;
        let next = (cur + delta).rem_euclid(n as isize) as usize;
        self.expenses.tsel.select(Some(next));
    }

    pub async fn handle_key(&mut self, k: KeyEvent) -> anyhow::Result<()> {
        if k.kind != KeyEventKind::Press {
            return Ok(());
        }

        if self.tab == Tab::AddExpense && self.add.editing.is_some() {
            self.handle_form_input(k);
            return Ok(());
        }

        match k.code {
            KeyCode::Char('q') => {
                self.quit = true;
                return Ok(());
            }
            KeyCode::Tab => {
                self.tab = self.tab.shift(1);
                return Ok(());
            }
            KeyCode::BackTab => {
                self.tab = self.tab.shift(-1);
                return Ok(());
            }
            KeyCode::Char('?') => {
                self.tab = Tab::Help;
                return Ok(());
            }
            _ => {}
        }

        match self.tab {
            Tab::Expenses => match k.code {
                KeyCode::Up => self.move_row(-1),
                KeyCode::Down => self.move_row(1),
                KeyCode::Char('d') => {
                    self.expenses.filters.date_range = self.expenses.filters.date_range.cycle();
                    self.filters_changed().await;
                }
                KeyCode::Char('c') => {
                    self.expenses.filters.clear();
                    self.filters_changed().await;
                }
                KeyCode::Char(ch) if category_hotkey(ch).is_some() => {
                    if let Some(cat) = category_hotkey(ch) {
                        self.expenses.filters.toggle_category(cat);
                    }
                    self.filters_changed().await;
                }
                KeyCode::Char(ch) if payment_hotkey(ch).is_some() => {
                    if let Some(mode) = payment_hotkey(ch) {
                        self.expenses.filters.toggle_payment_mode(mode);
                    }
                    self.filters_changed().await;
                }
                KeyCode::Char('r') => self.filters_changed().await,
                KeyCode::Char('a') => self.tab = Tab::AddExpense,
                _ => {}
            },
            Tab::AddExpense => match k.code {
                KeyCode::Char('a') => self.add.editing = Some(EditField::Amount),
                KeyCode::Char('n') => self.add.editing = Some(EditField::Notes),
                KeyCode::Char('d') => self.add.editing = Some(EditField::Date),
                KeyCode::Enter => self.add.editing = Some(EditField::Amount),
                KeyCode::Char('c') => self.add.cycle_category(),
                KeyCode::Char('p') => self.add.cycle_payment_mode(),
                KeyCode::Char('s') => self.submit_expense().await?,
                KeyCode::Esc | KeyCode::Char('b') => {
                    self.add.error = None;
                    self.tab = Tab::Expenses;
                }
                _ => {}
            },
            Tab::Analytics => {
                if k.code == KeyCode::Char('r') {
                    if let Err(e) = self.refresh_analytics().await {
                        self.status = format!("Analytics failed: {e}");
                    }
                }
            }
            Tab::Help => {
                if matches!(k.code, KeyCode::Esc | KeyCode::Char('b')) {
                    self.tab = Tab::Expenses;
                }
            }
        }
        Ok(())
    }

    fn handle_form_input(&mut self, k: KeyEvent) {
        let Some(field) = self.add.editing else { return };
        match k.code {
            KeyCode::Char(c) => {
                let value = self.add.field_mut(field);
                if field != EditField::Notes || value.chars().count() < MAX_NOTES_LEN {
                    value.push(c);
                }
            }
            KeyCode::Backspace => {
                self.add.field_mut(field).pop();
            }
            KeyCode::Enter | KeyCode::Esc => self.add.editing = None,
            KeyCode::Tab => self.add.editing = Some(field.next()),
            KeyCode::BackTab => self.add.editing = Some(field.prev()),
            _ => {}
        }
    }

    pub async fn submit_expense(&mut self) -> anyhow::Result<()> {
        let req = match self.add.to_request() {
            Ok(req) => req,
            Err(msg) => {
                self.add.error = Some(msg);
                self.add.success = None;
                return Ok(());
            }
        };

        match self.api.create_expense(&req).await {
            Ok(saved) => {
                self.add = AddExpenseForm::blank();
                self.add.success = Some(format!("Expense added successfully (#{})", saved.id));
                self.filters_changed().await;
                if let Err(e) = self.refresh_analytics().await {
                    warn!(error = %e, "analytics refresh failed");
                    self.status = format!("Analytics failed: {e}");
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to add expense");
                self.add.error = Some(format!("Failed to add expense: {e}"));
                self.add.success = None;
            }
        }
        Ok(())
    }
}
