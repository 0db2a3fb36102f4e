//! Aggregate exposure metrics derived from a ledger snapshot.

use chrono::NaiveDate;
use uuid::Uuid;

use duebook_domain::{DebtStatus, Ledger, PaymentHistory, PlanStatus};

/// Outstanding share attributed to a single counterparty, for the
/// per-counterparty distribution breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterpartyShare {
    pub debt_id: Uuid,
    pub name: String,
    pub outstanding: f64,
}

/// One-screen overview of the whole ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerOverview {
    pub total_debt: f64,
    pub total_paid: f64,
    pub total_outstanding: f64,
    pub open_debts: usize,
    pub settled_debts: usize,
    pub overdue_debts: usize,
    pub payment_count: usize,
    pub debt_shares: Vec<CounterpartyShare>,
    pub active_plans: usize,
    pub completed_plans: usize,
    pub monthly_commitment: f64,
    pub outstanding_installments: f64,
}

impl LedgerOverview {
    /// Fraction of the total principal already covered, as a 0..=100 value.
    pub fn percent_paid(&self) -> f64 {
        if self.total_debt <= f64::EPSILON {
            return 0.0;
        }
        (self.total_paid / self.total_debt * 100.0).min(100.0)
    }
}

/// Derives read-only aggregates; never mutates the ledger.
pub struct SummaryService;

impl SummaryService {
    pub fn overview(ledger: &Ledger, today: NaiveDate) -> LedgerOverview {
        let mut overview = LedgerOverview::default();

        for debt in &ledger.debts {
            overview.total_debt += debt.amount;
            overview.total_paid += debt.paid_amount();
            overview.payment_count += debt.payment_count();
            match debt.status {
                DebtStatus::Unpaid => {
                    overview.open_debts += 1;
                    overview.total_outstanding += debt.remaining();
                    if debt.remaining() > 0.0 {
                        overview.debt_shares.push(CounterpartyShare {
                            debt_id: debt.id,
                            name: debt.name.clone(),
                            outstanding: debt.remaining(),
                        });
                    }
                }
                DebtStatus::Paid => overview.settled_debts += 1,
            }
            if debt.is_overdue(today) {
                overview.overdue_debts += 1;
            }
        }

        for plan in &ledger.installments {
            match plan.status {
                PlanStatus::Active => {
                    overview.active_plans += 1;
                    overview.monthly_commitment += plan.installment_amount;
                    overview.outstanding_installments += plan.outstanding_amount();
                }
                PlanStatus::Done => overview.completed_plans += 1,
            }
        }

        overview
            .debt_shares
            .sort_by(|a, b| b.outstanding.total_cmp(&a.outstanding));
        overview
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebtDraft, DebtService, InstallmentService, PlanDraft};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();

        let mut overdue = DebtDraft::new("Budi", 500_000.0, date(2024, 5, 1));
        overdue.due_date = Some(date(2024, 6, 1));
        let budi = DebtService::add(&mut ledger, overdue).unwrap();
        DebtService::add_payment(&mut ledger, budi, 200_000.0, date(2024, 5, 20), None).unwrap();

        let sari = DebtService::add(
            &mut ledger,
            DebtDraft::new("Sari", 100_000.0, date(2024, 6, 1)),
        )
        .unwrap();
        DebtService::add_payment(&mut ledger, sari, 100_000.0, date(2024, 6, 2), None).unwrap();

        let plan = InstallmentService::add(
            &mut ledger,
            PlanDraft::new("Laptop", 150_000.0, 12, 25, date(2024, 1, 25)),
        )
        .unwrap();
        InstallmentService::pay(&mut ledger, plan, 150_000.0, date(2024, 1, 25), None).unwrap();

        let mut done = PlanDraft::new("Phone", 50_000.0, 6, 10, date(2023, 7, 10));
        done.paid_installments = 6;
        InstallmentService::add(&mut ledger, done).unwrap();

        ledger
    }

    #[test]
    fn overview_reconciles_totals_and_counts() {
        let ledger = sample_ledger();
        let overview = SummaryService::overview(&ledger, date(2024, 6, 15));

        assert_eq!(overview.total_debt, 600_000.0);
        assert_eq!(overview.total_paid, 300_000.0);
        assert_eq!(overview.total_outstanding, 300_000.0);
        assert_eq!(overview.open_debts, 1);
        assert_eq!(overview.settled_debts, 1);
        assert_eq!(overview.overdue_debts, 1);
        assert_eq!(overview.payment_count, 2);
        assert_eq!(overview.percent_paid(), 50.0);

        assert_eq!(overview.debt_shares.len(), 1);
        assert_eq!(overview.debt_shares[0].name, "Budi");
        assert_eq!(overview.debt_shares[0].outstanding, 300_000.0);

        assert_eq!(overview.active_plans, 1);
        assert_eq!(overview.completed_plans, 1);
        assert_eq!(overview.monthly_commitment, 150_000.0);
        assert_eq!(overview.outstanding_installments, 11.0 * 150_000.0);
    }

    #[test]
    fn empty_ledger_yields_zeroed_overview() {
        let overview = SummaryService::overview(&Ledger::new(), date(2024, 6, 15));
        assert_eq!(overview, LedgerOverview::default());
        assert_eq!(overview.percent_paid(), 0.0);
    }
}
