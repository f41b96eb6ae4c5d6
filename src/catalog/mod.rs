//! Line-Item Catalog: the fixed income statement layout and its formulas
//!
//! The catalog is pure configuration. The calculation engine walks it in order and
//! interprets each `Formula`, so which base a percentage applies to is decided
//! here and nowhere else.

mod codes;

pub use codes::{LineCode, RevenueTypeCode, DIRECT_COSTS, GENERAL_ADMIN};

use crate::error::Result;
use crate::revenue::CareType;
use serde::Serialize;

/// Income statement section a line item is displayed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Revenue,
    RevenueMix,
    Discounts,
    NetRevenue,
    DirectCosts,
    GrossProfit,
    GeneralAdmin,
    Ebitda,
    BelowEbitda,
    ComprehensiveIncome,
}

/// Where a line item's value comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineKind {
    /// Raw revenue figure for one care type
    RawRevenue,
    /// Base amount times the item's own assumption percentage
    DirectInputPercent,
    /// Base amount times a payer-category allocation percentage
    RevenueTypeAllocation,
    /// Derived from other line items only
    Computed,
}

/// How a line item is evaluated
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Formula {
    /// Revenue amount for a care type
    Raw(CareType),
    /// `base × assumption(self)`
    PercentOf(LineCode),
    /// `base × allocation(code)`
    ShareOf { base: LineCode, allocation: RevenueTypeCode },
    /// `base × assumption(self) × allocation(code)`: the rejection cross term
    RejectionSplit { base: LineCode, allocation: RevenueTypeCode },
    /// Sum of the listed items
    Sum(&'static [LineCode]),
    /// `from − Σ less + Σ plus`
    Net {
        from: LineCode,
        less: &'static [LineCode],
        plus: &'static [LineCode],
    },
}

impl Formula {
    /// Line items this formula reads
    pub fn references(&self) -> Vec<LineCode> {
        match *self {
            Formula::Raw(_) => Vec::new(),
            Formula::PercentOf(base)
            | Formula::ShareOf { base, .. }
            | Formula::RejectionSplit { base, .. } => vec![base],
            Formula::Sum(items) => items.to_vec(),
            Formula::Net { from, less, plus } => {
                let mut refs = vec![from];
                refs.extend_from_slice(less);
                refs.extend_from_slice(plus);
                refs
            }
        }
    }
}

/// Static metadata for one income statement row
#[derive(Debug, Clone, Copy)]
pub struct LineItemDefinition {
    pub code: LineCode,
    pub name: &'static str,
    pub section: Section,
    pub kind: LineKind,
    pub is_subtotal: bool,
    pub participates_in_rejection_split: bool,
    pub formula: Formula,
}

const fn raw(code: LineCode, name: &'static str, care_type: CareType) -> LineItemDefinition {
    LineItemDefinition {
        code,
        name,
        section: Section::Revenue,
        kind: LineKind::RawRevenue,
        is_subtotal: false,
        participates_in_rejection_split: false,
        formula: Formula::Raw(care_type),
    }
}

const fn percent_of(code: LineCode, name: &'static str, section: Section, base: LineCode) -> LineItemDefinition {
    LineItemDefinition {
        code,
        name,
        section,
        kind: LineKind::DirectInputPercent,
        is_subtotal: false,
        participates_in_rejection_split: false,
        formula: Formula::PercentOf(base),
    }
}

const fn share_of(code: LineCode, name: &'static str, allocation: RevenueTypeCode, in_split: bool) -> LineItemDefinition {
    LineItemDefinition {
        code,
        name,
        section: Section::RevenueMix,
        kind: LineKind::RevenueTypeAllocation,
        is_subtotal: false,
        participates_in_rejection_split: in_split,
        formula: Formula::ShareOf { base: LineCode::RevSub, allocation },
    }
}

const fn rejection(code: LineCode, name: &'static str, allocation: RevenueTypeCode) -> LineItemDefinition {
    LineItemDefinition {
        code,
        name,
        section: Section::Discounts,
        kind: LineKind::DirectInputPercent,
        is_subtotal: false,
        participates_in_rejection_split: true,
        formula: Formula::RejectionSplit { base: LineCode::RevSub, allocation },
    }
}

const fn computed(code: LineCode, name: &'static str, section: Section, formula: Formula) -> LineItemDefinition {
    LineItemDefinition {
        code,
        name,
        section,
        kind: LineKind::Computed,
        is_subtotal: true,
        participates_in_rejection_split: false,
        formula,
    }
}

use LineCode as L;
use Section as S;

static CATALOG: [LineItemDefinition; LineCode::COUNT] = [
    raw(L::RevIp, "Inpatient Revenue", CareType::Ip),
    raw(L::RevOp, "Outpatient Revenue", CareType::Op),
    raw(L::RevEr, "Emergency Revenue", CareType::Er),
    computed(L::RevSub, "Sub Revenue", S::Revenue, Formula::Sum(&[L::RevIp, L::RevOp, L::RevEr])),
    share_of(L::RevTypeInsurance, "Insurance Revenue", RevenueTypeCode::Insurance, true),
    share_of(L::RevTypeCash, "Cash Revenue", RevenueTypeCode::Cash, false),
    share_of(L::RevTypeMoh, "MOH Revenue", RevenueTypeCode::Moh, true),
    share_of(L::RevTypeOtherCredit, "Other Credit Revenue", RevenueTypeCode::OtherCredit, false),
    rejection(L::DisRejectionMoh, "Rejection - MOH", RevenueTypeCode::Moh),
    rejection(L::DisRejectionIns, "Rejection - Insurance", RevenueTypeCode::Insurance),
    computed(L::DisRejection, "Rejection Expense", S::Discounts, Formula::Sum(&[L::DisRejectionMoh, L::DisRejectionIns])),
    percent_of(L::DisVolume, "Volume Discount", S::Discounts, L::RevSub),
    percent_of(L::DisEarlyPay, "Early Payment Discount", S::Discounts, L::RevSub),
    computed(
        L::DisSettlement,
        "Total Settlement Discounts",
        S::Discounts,
        Formula::Sum(&[L::DisRejection, L::DisVolume, L::DisEarlyPay]),
    ),
    computed(
        L::RevNet,
        "Net Revenue",
        S::NetRevenue,
        Formula::Net { from: L::RevSub, less: &[L::DisSettlement], plus: &[] },
    ),
    percent_of(L::DcMedicalSalaries, "Medical Staff Salaries", S::DirectCosts, L::RevNet),
    percent_of(L::DcNursingSalaries, "Nursing Salaries", S::DirectCosts, L::RevNet),
    percent_of(L::DcAlliedSalaries, "Allied Health Salaries", S::DirectCosts, L::RevNet),
    percent_of(L::DcDoctorIncentives, "Doctor Incentives", S::DirectCosts, L::RevNet),
    percent_of(L::DcMedicalSupplies, "Medical Supplies", S::DirectCosts, L::RevNet),
    percent_of(L::DcPharmaceuticals, "Pharmaceuticals", S::DirectCosts, L::RevNet),
    percent_of(L::DcLabOutsourcing, "Outsourced Laboratory", S::DirectCosts, L::RevNet),
    percent_of(L::DcRadiologyOutsourcing, "Outsourced Radiology", S::DirectCosts, L::RevNet),
    percent_of(L::DcFoodServices, "Patient Food Services", S::DirectCosts, L::RevNet),
    percent_of(L::DcLaundry, "Laundry", S::DirectCosts, L::RevNet),
    percent_of(L::DcMedicalMaintenance, "Medical Equipment Maintenance", S::DirectCosts, L::RevNet),
    percent_of(L::DcFacilityUtilities, "Facility Utilities", S::DirectCosts, L::RevNet),
    percent_of(L::DcFacilityRent, "Facility Rent", S::DirectCosts, L::RevNet),
    percent_of(L::DcOtherDirect, "Other Direct Costs", S::DirectCosts, L::RevNet),
    computed(L::TotalDc, "Total Direct Costs", S::DirectCosts, Formula::Sum(DIRECT_COSTS)),
    computed(
        L::GrossProfit,
        "Gross Profit",
        S::GrossProfit,
        Formula::Net { from: L::RevNet, less: &[L::TotalDc], plus: &[] },
    ),
    percent_of(L::GaAdminSalaries, "Administrative Salaries", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaOfficeRent, "Office Rent", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaUtilities, "Office Utilities", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaMarketing, "Marketing", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaItSystems, "IT Systems", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaProfessionalFees, "Professional Fees", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaInsurance, "Insurance", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaTravel, "Travel", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaTraining, "Training", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaBankCharges, "Bank Charges", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaGovernmentFees, "Government Fees", S::GeneralAdmin, L::RevNet),
    percent_of(L::GaOther, "Other G&A", S::GeneralAdmin, L::RevNet),
    computed(L::TotalGa, "Total G&A", S::GeneralAdmin, Formula::Sum(GENERAL_ADMIN)),
    percent_of(L::OtherIncome, "Other Income", S::Ebitda, L::RevNet),
    computed(
        L::Ebitda,
        "EBITDA",
        S::Ebitda,
        Formula::Net { from: L::GrossProfit, less: &[L::TotalGa], plus: &[L::OtherIncome] },
    ),
    percent_of(L::FinanceCost, "Finance Cost", S::BelowEbitda, L::RevNet),
    percent_of(L::Depreciation, "Depreciation", S::BelowEbitda, L::RevNet),
    percent_of(L::Zakat, "Zakat", S::BelowEbitda, L::RevNet),
    computed(
        L::NetProfit,
        "Net Profit",
        S::BelowEbitda,
        Formula::Net { from: L::Ebitda, less: &[L::FinanceCost, L::Depreciation, L::Zakat], plus: &[] },
    ),
    percent_of(L::Oci, "Other Comprehensive Income", S::ComprehensiveIncome, L::RevNet),
    computed(
        L::TotalCompIncome,
        "Total Comprehensive Income",
        S::ComprehensiveIncome,
        Formula::Net { from: L::NetProfit, less: &[], plus: &[L::Oci] },
    ),
];

/// All definitions in evaluation order
pub fn definitions() -> &'static [LineItemDefinition] {
    &CATALOG
}

pub fn definition(code: LineCode) -> &'static LineItemDefinition {
    &CATALOG[code.index()]
}

/// Resolve an external code string; unknown codes are an error, never skipped
pub fn lookup(code: &str) -> Result<&'static LineItemDefinition> {
    Ok(definition(code.parse()?))
}

/// Line items whose value is driven by a stored assumption percentage
pub fn assumption_codes() -> impl Iterator<Item = LineCode> {
    CATALOG
        .iter()
        .filter(|def| def.kind == LineKind::DirectInputPercent)
        .map(|def| def.code)
}

pub fn section_items(section: Section) -> impl Iterator<Item = &'static LineItemDefinition> {
    CATALOG.iter().filter(move |def| def.section == section)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_evaluation_order() {
        assert_eq!(CATALOG.len(), LineCode::ALL.len());
        for (def, code) in CATALOG.iter().zip(LineCode::ALL) {
            assert_eq!(def.code, *code, "catalog row out of order at {}", code);
        }
    }

    #[test]
    fn test_formulas_only_reference_earlier_items() {
        for def in definitions() {
            for referenced in def.formula.references() {
                assert!(
                    referenced.index() < def.code.index(),
                    "{} references {} which is evaluated later",
                    def.code,
                    referenced
                );
            }
        }
    }

    #[test]
    fn test_cost_bases_are_net_revenue() {
        for code in DIRECT_COSTS.iter().chain(GENERAL_ADMIN) {
            assert_eq!(definition(*code).formula, Formula::PercentOf(LineCode::RevNet));
        }
        for code in [L::OtherIncome, L::FinanceCost, L::Depreciation, L::Zakat, L::Oci] {
            assert_eq!(definition(code).formula, Formula::PercentOf(LineCode::RevNet));
        }
        for code in [L::DisVolume, L::DisEarlyPay] {
            assert_eq!(definition(code).formula, Formula::PercentOf(LineCode::RevSub));
        }
    }

    #[test]
    fn test_rejection_split_members() {
        let members: Vec<_> = definitions()
            .iter()
            .filter(|def| def.participates_in_rejection_split)
            .map(|def| def.code)
            .collect();
        assert_eq!(
            members,
            vec![L::RevTypeInsurance, L::RevTypeMoh, L::DisRejectionMoh, L::DisRejectionIns]
        );
    }

    #[test]
    fn test_assumption_codes() {
        let codes: Vec<_> = assumption_codes().collect();
        // 2 rejection + 2 discounts + 14 direct + 12 G&A + other income + 3 below EBITDA + OCI
        assert_eq!(codes.len(), 35);
        assert!(codes.contains(&L::DisRejectionMoh));
        assert!(!codes.contains(&L::Ebitda));
        assert!(!codes.contains(&L::RevTypeMoh));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("GROSS_PROFIT").unwrap().name, "Gross Profit");
        assert!(lookup("GROSS_MARGIN").is_err());
        assert_eq!(section_items(Section::DirectCosts).count(), 15);
    }
}
