//! Position state machine and closed trades.

/// The backtester's single position. Long-only: a SHORT arm would slot in
/// here next to `Long`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Position {
    #[default]
    Flat,
    Long {
        entry_bar_index: usize,
        entry_price: f64,
    },
}

impl Position {
    pub fn is_flat(&self) -> bool {
        matches!(self, Position::Flat)
    }

    /// Close a long position, leaving the position flat. Returns `None` (and
    /// changes nothing) when already flat.
    pub fn close(&mut self, exit_bar_index: usize, exit_price: f64) -> Option<Trade> {
        match *self {
            Position::Flat => None,
            Position::Long {
                entry_bar_index,
                entry_price,
            } => {
                *self = Position::Flat;
                Some(Trade::new(
                    entry_bar_index,
                    entry_price,
                    exit_bar_index,
                    exit_price,
                ))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trade {
    pub entry_bar_index: usize,
    pub entry_price: f64,
    pub exit_bar_index: usize,
    pub exit_price: f64,
    /// (exit - entry) / entry, as a fraction.
    pub return_pct: f64,
}

impl Trade {
    pub fn new(
        entry_bar_index: usize,
        entry_price: f64,
        exit_bar_index: usize,
        exit_price: f64,
    ) -> Self {
        Trade {
            entry_bar_index,
            entry_price,
            exit_bar_index,
            exit_price,
            return_pct: return_pct(entry_price, exit_price),
        }
    }

    pub fn hold_bars(&self) -> usize {
        self.exit_bar_index.saturating_sub(self.entry_bar_index)
    }

    pub fn is_win(&self) -> bool {
        self.return_pct > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.return_pct < 0.0
    }
}

fn return_pct(entry_price: f64, exit_price: f64) -> f64 {
    (exit_price - entry_price) / entry_price
}
