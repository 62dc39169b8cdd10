use chrono::{Datelike, NaiveDateTime, TimeDelta};
use rand::Rng;

use telefatura_core::money::{round2, sum};

use crate::catalog::{
    CATEGORIES, CLIENTS, Category, MAX_BASE_VALUE, MAX_ITEMS, MAX_PERIOD_DAYS_BACK, MIN_BASE_VALUE,
    MIN_ITEMS, OPERATORS, PERIOD_LENGTH_DAYS, TaxKind,
};
use crate::invoice::{Invoice, LineItem, Party, TaxLine, Totals};

/// Build one invoice.
///
/// `index` drives the client CNPJ, `due_date` is copied verbatim and `now`
/// anchors the randomly chosen billing period. All randomness comes from
/// `rng`, so a seeded generator reproduces the invoice exactly.
pub fn generate_invoice<R: Rng + ?Sized>(
    index: u64,
    due_date: NaiveDateTime,
    now: NaiveDateTime,
    rng: &mut R,
) -> Invoice {
    let operator = &OPERATORS[0];
    let client_name = pick(&CLIENTS, rng);
    let period_start = billing_period_start(now, rng);
    let period_end = period_start + TimeDelta::days(PERIOD_LENGTH_DAYS);
    let issued_at = period_end + TimeDelta::days(1);

    let item_count = rng.random_range(MIN_ITEMS..=MAX_ITEMS);
    let mut items = Vec::with_capacity(item_count);
    let mut services = 0.0;
    let mut tax_accumulators = [0.0_f64; 3];

    for _ in 0..item_count {
        let category = pick(&CATEGORIES, rng);
        let base_value = round2(rng.random_range(MIN_BASE_VALUE..=MAX_BASE_VALUE));
        let item = line_item(category, base_value);

        services += item.base_value;
        for (accumulator, tax) in tax_accumulators.iter_mut().zip(&item.taxes) {
            *accumulator += tax.amount;
        }
        items.push(item);
    }

    let taxes_total = round2(sum(tax_accumulators));
    let totals = Totals {
        services: round2(services),
        taxes: TaxKind::ALL
            .into_iter()
            .zip(tax_accumulators)
            .map(|(kind, amount)| (kind, round2(amount)))
            .collect(),
        taxes_total,
        grand_total: round2(services + taxes_total),
    };

    Invoice {
        operator: Party {
            name: operator.name.to_string(),
            cnpj: operator.cnpj.to_string(),
        },
        client: Party {
            name: client_name.to_string(),
            cnpj: client_cnpj(index),
        },
        contract_number: rng.random_range(40_000_000_u32..=49_999_999).to_string(),
        period_start,
        period_end,
        issued_at,
        due_date,
        items,
        totals,
    }
}

/// Line item for a category with its three taxes and rounded totals.
pub fn line_item(category: &Category, base_value: f64) -> LineItem {
    let taxes: Vec<TaxLine> = TaxKind::ALL
        .into_iter()
        .map(|kind| tax_line(kind, base_value))
        .collect();
    let tax_subtotal = round2(sum(taxes.iter().map(|tax| tax.amount)));

    LineItem {
        category: category.code,
        description: category.description,
        quantity: 1,
        unit: category.unit,
        base_value,
        taxes,
        tax_subtotal,
        total: round2(base_value + tax_subtotal),
    }
}

pub fn tax_line(kind: TaxKind, base_value: f64) -> TaxLine {
    TaxLine {
        kind,
        rate: kind.rate(),
        base: round2(base_value),
        amount: round2(base_value * kind.rate()),
    }
}

/// Pseudo-unique client CNPJ derived from the invoice index.
pub fn client_cnpj(index: u64) -> String {
    let base = 10_000_000 + (index % 90_000_000);
    let branch_suffix = (index % 90) + 10;
    format!("{base:08}/0001-{branch_suffix:02}")
}

/// First day of a month up to [`MAX_PERIOD_DAYS_BACK`] days before `now`,
/// keeping the time of day.
fn billing_period_start<R: Rng + ?Sized>(now: NaiveDateTime, rng: &mut R) -> NaiveDateTime {
    let days_back = rng.random_range(0..=MAX_PERIOD_DAYS_BACK);
    let shifted = now - TimeDelta::days(days_back);
    shifted.with_day(1).unwrap_or(shifted)
}

fn pick<'a, T, R: Rng + ?Sized>(values: &'a [T], rng: &mut R) -> &'a T {
    &values[rng.random_range(0..values.len())]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    #[test]
    fn cnpj_follows_index() {
        assert_eq!(client_cnpj(0), "10000000/0001-10");
        assert_eq!(client_cnpj(1), "10000001/0001-11");
        assert_eq!(client_cnpj(89), "10000089/0001-99");
        assert_eq!(client_cnpj(90), "10000090/0001-10");
        assert_eq!(client_cnpj(90_000_000), "10000000/0001-10");
    }

    #[test]
    fn tax_lines_use_fixed_rates() {
        let item = line_item(&CATEGORIES[0], 100.0);
        let amounts: Vec<(&str, f64, f64)> = item
            .taxes
            .iter()
            .map(|tax| (tax.kind.code(), tax.rate, tax.amount))
            .collect();

        assert_eq!(
            amounts,
            [
                ("ICMS", 0.25, 25.0),
                ("PIS", 0.0165, 1.65),
                ("COFINS", 0.076, 7.6),
            ]
        );
        assert_eq!(item.tax_subtotal, 34.25);
        assert_eq!(item.total, 134.25);
        assert!(item.taxes.iter().all(|tax| tax.base == 100.0));
    }

    #[test]
    fn line_item_rounds_each_step() {
        let item = line_item(&CATEGORIES[2], 123.45);
        // ICMS 30.8625 -> 30.86, PIS 2.036925 -> 2.04, COFINS 9.3822 -> 9.38
        assert_eq!(item.taxes[0].amount, 30.86);
        assert_eq!(item.taxes[1].amount, 2.04);
        assert_eq!(item.taxes[2].amount, 9.38);
        assert_eq!(item.tax_subtotal, 42.28);
        assert_eq!(item.total, 165.73);
    }

    #[test]
    fn period_starts_on_first_of_month() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 17)
            .and_then(|date| date.and_hms_opt(10, 30, 0))
            .expect("valid now");
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for _ in 0..200 {
            let start = billing_period_start(now, &mut rng);
            assert_eq!(start.day(), 1);
            assert_eq!(start.time(), now.time());
            assert!(start <= now);
            assert!(start >= date(2024, 1, 1));
        }
    }

    #[test]
    fn item_count_and_values_stay_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for index in 0..100 {
            let invoice = generate_invoice(index, date(2024, 2, 1), date(2024, 6, 1), &mut rng);
            assert!((MIN_ITEMS..=MAX_ITEMS).contains(&invoice.items.len()));
            for item in &invoice.items {
                assert!(item.base_value >= MIN_BASE_VALUE && item.base_value <= MAX_BASE_VALUE);
            }
            let contract: u32 = invoice.contract_number.parse().expect("numeric contract");
            assert!((40_000_000..=49_999_999).contains(&contract));
        }
    }
}
