use chrono::{NaiveDateTime, Timelike};

use telefatura_core::{Map, Value};

use crate::catalog::{
    CURRENCY, INVOICE_KIND, PAYMENT_METHOD, PAYMENT_STATUS, SOURCE, TaxKind,
};

/// A synthesized telecom invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub operator: Party,
    pub client: Party,
    pub contract_number: String,
    pub period_start: NaiveDateTime,
    pub period_end: NaiveDateTime,
    pub issued_at: NaiveDateTime,
    pub due_date: NaiveDateTime,
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

/// Operator or client identification.
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    pub name: String,
    pub cnpj: String,
}

/// One billable service with its tax breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub category: &'static str,
    pub description: &'static str,
    pub quantity: i64,
    pub unit: &'static str,
    pub base_value: f64,
    pub taxes: Vec<TaxLine>,
    pub tax_subtotal: f64,
    pub total: f64,
}

/// A tax applied to a line item's base value.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxLine {
    pub kind: TaxKind,
    pub rate: f64,
    pub base: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub services: f64,
    /// Per-tax totals in [`TaxKind::ALL`] order.
    pub taxes: Vec<(TaxKind, f64)>,
    pub taxes_total: f64,
    pub grand_total: f64,
}

impl Invoice {
    /// Ordered tree handed to the XML encoder.
    pub fn to_value(&self) -> Value {
        let issued_at = format_timestamp(self.issued_at);

        Map::new()
            .with("tipo", INVOICE_KIND)
            .with("operadora", self.operator.to_value())
            .with(
                "cliente",
                Map::new()
                    .with("razaoSocial", self.client.name.as_str())
                    .with("cnpj", self.client.cnpj.as_str()),
            )
            .with("contrato", Map::new().with("numero", self.contract_number.as_str()))
            .with(
                "periodoReferencia",
                Map::new()
                    .with("inicio", format_timestamp(self.period_start))
                    .with("fim", format_timestamp(self.period_end)),
            )
            .with(
                "datas",
                Map::new()
                    .with("emissao", issued_at.as_str())
                    .with("vencimento", format_timestamp(self.due_date)),
            )
            .with("moeda", CURRENCY)
            .with(
                "itens",
                self.items.iter().map(LineItem::to_value).collect::<Vec<_>>(),
            )
            .with("totais", self.totals.to_value())
            .with(
                "pagamento",
                Map::new()
                    .with("metodo", PAYMENT_METHOD)
                    .with("status", PAYMENT_STATUS),
            )
            .with(
                "auditoria",
                Map::new()
                    .with("criadoEm", issued_at.as_str())
                    .with("atualizadoEm", issued_at.as_str())
                    .with("fonte", SOURCE),
            )
            .into()
    }
}

impl Party {
    fn to_value(&self) -> Value {
        Map::new()
            .with("nome", self.name.as_str())
            .with("cnpj", self.cnpj.as_str())
            .into()
    }
}

impl LineItem {
    fn to_value(&self) -> Value {
        Map::new()
            .with("categoria", self.category)
            .with("descricao", self.description)
            .with("quantidade", self.quantity)
            .with("unidade", self.unit)
            .with("valorBase", self.base_value)
            .with(
                "impostos",
                self.taxes.iter().map(TaxLine::to_value).collect::<Vec<_>>(),
            )
            .with("subtotalImpostos", self.tax_subtotal)
            .with("total", self.total)
            .into()
    }
}

impl TaxLine {
    fn to_value(&self) -> Value {
        Map::new()
            .with("tipo", self.kind.code())
            .with("aliquota", self.rate)
            .with("baseCalculo", self.base)
            .with("valor", self.amount)
            .into()
    }
}

impl Totals {
    fn to_value(&self) -> Value {
        let taxes: Map = self
            .taxes
            .iter()
            .map(|(kind, amount)| (kind.code(), *amount))
            .collect();

        Map::new()
            .with("valorServicosSemImpostos", self.services)
            .with("impostos", taxes)
            .with("totalImpostos", self.taxes_total)
            .with("totalGeral", self.grand_total)
            .into()
    }
}

/// ISO-8601 with a `Z` suffix; microseconds only when non-zero.
pub fn format_timestamp(value: NaiveDateTime) -> String {
    let micros = value.nanosecond() / 1_000;
    let base = value.format("%Y-%m-%dT%H:%M:%S");
    if micros == 0 {
        format!("{base}Z")
    } else {
        format!("{base}.{micros:06}Z")
    }
}
