//! Line classifier and section tracker.
//!
//! Walks a statement's trimmed lines, follows section banners to know which
//! asset class the current table holds, and decides which lines are worth
//! handing to the grammar matchers. Each broker supplies its own
//! [`SectionRules`]; the order of checks is the same for all of them:
//!
//! 1. section banner (may or may not consume the line)
//! 2. section exit (options, transactions)
//! 3. summary prefixes ("Total", "Estimated", ...)
//! 4. boilerplate phrases
//! 5. cash sweep
//! 6. position candidate if inside a position section, otherwise dropped

use folio_core::{AssetType, normalize};
use regex::Regex;

/// Mutable state for one document's scan
#[derive(Debug, Clone, PartialEq)]
pub struct SectionContext {
    pub current_asset_type: AssetType,
    pub in_positions: bool,
    /// Latest cash sweep balance seen in the document
    pub cash_accumulator: f64,
}

impl SectionContext {
    pub fn new(in_positions: bool) -> Self {
        Self {
            current_asset_type: AssetType::Stock,
            in_positions,
            cash_accumulator: 0.0,
        }
    }
}

impl Default for SectionContext {
    fn default() -> Self {
        Self::new(false)
    }
}

/// A line that opens a section of a given asset class
#[derive(Debug, Clone)]
pub struct Banner {
    pub pattern: Regex,
    pub asset_type: AssetType,
}

impl Banner {
    pub fn new(pattern: &str, asset_type: AssetType) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            asset_type,
        })
    }
}

/// Per-broker classification table
#[derive(Debug, Clone, Default)]
pub struct SectionRules {
    /// Checked in order; the first matching banner wins
    pub banners: Vec<Banner>,
    /// When false, a banner line is still offered to the matchers
    pub banners_consume: bool,
    /// Substrings that close the position section
    pub exits: Vec<&'static str>,
    /// Line prefixes for totals/summary rows
    pub summary_prefixes: Vec<&'static str>,
    /// Substrings marking headers, footers and other noise
    pub boilerplate: Vec<&'static str>,
    /// Sweep line pattern; capture group 1 is the balance
    pub cash_sweep: Option<Regex>,
    pub starts_in_positions: bool,
}

impl SectionRules {
    pub fn is_summary(&self, line: &str) -> bool {
        self.summary_prefixes.iter().any(|p| line.starts_with(p))
    }

    pub fn is_boilerplate(&self, line: &str) -> bool {
        self.boilerplate.iter().any(|kw| line.contains(kw))
    }
}

/// What the tracker decided about one line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineClass {
    /// Section banner, consumed
    Banner(AssetType),
    /// Options/transactions banner; position extraction paused
    SectionExit,
    /// Totals row
    Summary,
    Boilerplate,
    /// Cash sweep row carrying this balance
    CashSweep(f64),
    /// Eligible for position extraction
    Position,
    /// Outside any position section
    Ignored,
}

impl LineClass {
    pub fn is_eligible(&self) -> bool {
        matches!(self, LineClass::Position)
    }
}

pub struct SectionTracker<'r> {
    rules: &'r SectionRules,
    ctx: SectionContext,
}

impl<'r> SectionTracker<'r> {
    pub fn new(rules: &'r SectionRules) -> Self {
        Self {
            rules,
            ctx: SectionContext::new(rules.starts_in_positions),
        }
    }

    pub fn context(&self) -> &SectionContext {
        &self.ctx
    }

    pub fn into_context(self) -> SectionContext {
        self.ctx
    }

    /// Classify one trimmed line, updating section state.
    pub fn classify(&mut self, line: &str) -> LineClass {
        let rules = self.rules;

        if let Some(banner) = rules.banners.iter().find(|b| b.pattern.is_match(line)) {
            self.ctx.in_positions = true;
            self.ctx.current_asset_type = banner.asset_type;
            if rules.banners_consume {
                return LineClass::Banner(banner.asset_type);
            }
        }

        if rules.exits.iter().any(|e| line.contains(e)) {
            self.ctx.in_positions = false;
            return LineClass::SectionExit;
        }

        if rules.is_summary(line) {
            return LineClass::Summary;
        }

        if rules.is_boilerplate(line) {
            return LineClass::Boilerplate;
        }

        if let Some(caps) = rules.cash_sweep.as_ref().and_then(|re| re.captures(line)) {
            let balance = normalize(caps.get(1).map(|m| m.as_str()));
            self.ctx.cash_accumulator = balance;
            return LineClass::CashSweep(balance);
        }

        if self.ctx.in_positions {
            LineClass::Position
        } else {
            LineClass::Ignored
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> SectionRules {
        SectionRules {
            banners: vec![
                Banner::new("Positions - Equities", AssetType::Stock).unwrap(),
                Banner::new("Positions - Fixed Income", AssetType::Bond).unwrap(),
            ],
            banners_consume: true,
            exits: vec!["Positions - Options", "Transactions"],
            summary_prefixes: vec!["Total", "Estimated"],
            boilerplate: vec!["Page "],
            cash_sweep: Some(Regex::new(r"BankSweep\s+\S+\s+[\d,]+\.\d+\s+([\d,]+\.\d+)").unwrap()),
            starts_in_positions: false,
        }
    }

    #[test]
    fn test_lines_outside_sections_are_ignored() {
        let r = rules();
        let mut t = SectionTracker::new(&r);
        assert_eq!(t.classify("META META PLATFORMS 1.00"), LineClass::Ignored);
        assert!(!t.context().in_positions);
    }

    #[test]
    fn test_banner_enters_section_and_sets_type() {
        let r = rules();
        let mut t = SectionTracker::new(&r);
        assert_eq!(t.classify("Positions - Fixed Income"), LineClass::Banner(AssetType::Bond));
        assert!(t.context().in_positions);
        assert_eq!(t.context().current_asset_type, AssetType::Bond);
        assert!(t.classify("912828ZT0 USTREAS ...").is_eligible());
    }

    #[test]
    fn test_exit_and_summary_rows() {
        let r = rules();
        let mut t = SectionTracker::new(&r);
        t.classify("Positions - Equities");
        assert_eq!(t.classify("Total Equities 1,000.00"), LineClass::Summary);
        assert_eq!(t.classify("Estimated Annual Income"), LineClass::Summary);
        assert!(t.context().in_positions);
        assert_eq!(t.classify("Transactions - Summary"), LineClass::SectionExit);
        assert_eq!(t.classify("AAPL APPLE 1.00 2.00 2.00 1.00 1.00"), LineClass::Ignored);
    }

    #[test]
    fn test_cash_sweep_recorded_anywhere_last_wins() {
        let r = rules();
        let mut t = SectionTracker::new(&r);
        assert_eq!(
            t.classify("BankSweep CHARLESSCHWAB 100.00 1,500.25"),
            LineClass::CashSweep(1500.25)
        );
        t.classify("BankSweep CHARLESSCHWAB 1,500.25 20,825.65");
        assert_eq!(t.into_context().cash_accumulator, 20825.65);
    }

    #[test]
    fn test_non_consuming_banner_still_eligible() {
        let mut r = rules();
        r.banners_consume = false;
        let mut t = SectionTracker::new(&r);
        assert_eq!(t.classify("Positions - Equities"), LineClass::Position);
    }
}
