//! Line item and revenue-type codes
//!
//! Declaration order of `LineCode` is the evaluation order of the cascade: every
//! computed item only references items declared before it.

use crate::error::{BudgetError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! line_codes {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// Code of one income statement row
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum LineCode {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl LineCode {
            /// Every code, in evaluation order
            pub const ALL: &'static [LineCode] = &[$(LineCode::$variant),+];

            pub const COUNT: usize = [$($code),+].len();

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(LineCode::$variant => $code,)+
                }
            }
        }

        impl FromStr for LineCode {
            type Err = BudgetError;

            fn from_str(s: &str) -> Result<Self> {
                match s.trim() {
                    $($code => Ok(LineCode::$variant),)+
                    _ => Err(BudgetError::UnknownLineItem(s.to_string())),
                }
            }
        }
    };
}

line_codes! {
    RevIp => "REV_IP",
    RevOp => "REV_OP",
    RevEr => "REV_ER",
    RevSub => "REV_SUB",

    RevTypeInsurance => "REV_TYPE_INSURANCE",
    RevTypeCash => "REV_TYPE_CASH",
    RevTypeMoh => "REV_TYPE_MOH",
    RevTypeOtherCredit => "REV_TYPE_OTHER_CREDIT",

    DisRejectionMoh => "DIS_REJECTION_MOH",
    DisRejectionIns => "DIS_REJECTION_INS",
    DisRejection => "DIS_REJECTION",
    DisVolume => "DIS_VOLUME",
    DisEarlyPay => "DIS_EARLY_PAY",
    DisSettlement => "DIS_SETTLEMENT",

    RevNet => "REV_NET",

    DcMedicalSalaries => "DC_MEDICAL_SALARIES",
    DcNursingSalaries => "DC_NURSING_SALARIES",
    DcAlliedSalaries => "DC_ALLIED_SALARIES",
    DcDoctorIncentives => "DC_DOCTOR_INCENTIVES",
    DcMedicalSupplies => "DC_MEDICAL_SUPPLIES",
    DcPharmaceuticals => "DC_PHARMACEUTICALS",
    DcLabOutsourcing => "DC_LAB_OUTSOURCING",
    DcRadiologyOutsourcing => "DC_RADIOLOGY_OUTSOURCING",
    DcFoodServices => "DC_FOOD_SERVICES",
    DcLaundry => "DC_LAUNDRY",
    DcMedicalMaintenance => "DC_MEDICAL_MAINTENANCE",
    DcFacilityUtilities => "DC_FACILITY_UTILITIES",
    DcFacilityRent => "DC_FACILITY_RENT",
    DcOtherDirect => "DC_OTHER_DIRECT",
    TotalDc => "TOTAL_DC",

    GrossProfit => "GROSS_PROFIT",

    GaAdminSalaries => "GA_ADMIN_SALARIES",
    GaOfficeRent => "GA_OFFICE_RENT",
    GaUtilities => "GA_UTILITIES",
    GaMarketing => "GA_MARKETING",
    GaItSystems => "GA_IT_SYSTEMS",
    GaProfessionalFees => "GA_PROFESSIONAL_FEES",
    GaInsurance => "GA_INSURANCE",
    GaTravel => "GA_TRAVEL",
    GaTraining => "GA_TRAINING",
    GaBankCharges => "GA_BANK_CHARGES",
    GaGovernmentFees => "GA_GOVERNMENT_FEES",
    GaOther => "GA_OTHER",
    TotalGa => "TOTAL_GA",

    OtherIncome => "OTHER_INCOME",
    Ebitda => "EBITDA",

    FinanceCost => "FINANCE_COST",
    Depreciation => "DEPRECIATION",
    Zakat => "ZAKAT",
    NetProfit => "NET_PROFIT",

    Oci => "OCI",
    TotalCompIncome => "TOTAL_COMP_INCOME",
}

impl LineCode {
    /// Slot of this code in evaluation-ordered arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LineCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fourteen direct-cost lines summed into TOTAL_DC
pub const DIRECT_COSTS: &[LineCode] = &[
    LineCode::DcMedicalSalaries,
    LineCode::DcNursingSalaries,
    LineCode::DcAlliedSalaries,
    LineCode::DcDoctorIncentives,
    LineCode::DcMedicalSupplies,
    LineCode::DcPharmaceuticals,
    LineCode::DcLabOutsourcing,
    LineCode::DcRadiologyOutsourcing,
    LineCode::DcFoodServices,
    LineCode::DcLaundry,
    LineCode::DcMedicalMaintenance,
    LineCode::DcFacilityUtilities,
    LineCode::DcFacilityRent,
    LineCode::DcOtherDirect,
];

/// The twelve G&A lines summed into TOTAL_GA
pub const GENERAL_ADMIN: &[LineCode] = &[
    LineCode::GaAdminSalaries,
    LineCode::GaOfficeRent,
    LineCode::GaUtilities,
    LineCode::GaMarketing,
    LineCode::GaItSystems,
    LineCode::GaProfessionalFees,
    LineCode::GaInsurance,
    LineCode::GaTravel,
    LineCode::GaTraining,
    LineCode::GaBankCharges,
    LineCode::GaGovernmentFees,
    LineCode::GaOther,
];

/// Payer category of a revenue-type allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RevenueTypeCode {
    #[serde(rename = "INSURANCE")]
    Insurance,
    #[serde(rename = "CASH")]
    Cash,
    #[serde(rename = "MOH")]
    Moh,
    #[serde(rename = "OTHER_CREDIT")]
    OtherCredit,
}

impl RevenueTypeCode {
    pub const ALL: [RevenueTypeCode; 4] = [
        RevenueTypeCode::Insurance,
        RevenueTypeCode::Cash,
        RevenueTypeCode::Moh,
        RevenueTypeCode::OtherCredit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RevenueTypeCode::Insurance => "INSURANCE",
            RevenueTypeCode::Cash => "CASH",
            RevenueTypeCode::Moh => "MOH",
            RevenueTypeCode::OtherCredit => "OTHER_CREDIT",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Income statement row showing the revenue apportioned to this payer
    pub fn line_code(self) -> LineCode {
        match self {
            RevenueTypeCode::Insurance => LineCode::RevTypeInsurance,
            RevenueTypeCode::Cash => LineCode::RevTypeCash,
            RevenueTypeCode::Moh => LineCode::RevTypeMoh,
            RevenueTypeCode::OtherCredit => LineCode::RevTypeOtherCredit,
        }
    }
}

impl FromStr for RevenueTypeCode {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        // Accept the bare payer code or the line code prefixed with REV_TYPE_
        let bare = trimmed.strip_prefix("REV_TYPE_").unwrap_or(trimmed);
        RevenueTypeCode::ALL
            .into_iter()
            .find(|code| code.as_str() == bare)
            .ok_or_else(|| BudgetError::UnknownRevenueType(s.to_string()))
    }
}

impl fmt::Display for RevenueTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_code_round_trip_and_order() {
        assert_eq!(LineCode::COUNT, LineCode::ALL.len());
        for (i, code) in LineCode::ALL.iter().enumerate() {
            assert_eq!(code.index(), i);
            assert_eq!(code.as_str().parse::<LineCode>().unwrap(), *code);
        }
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = "DC_CATERING".parse::<LineCode>().unwrap_err();
        assert!(matches!(err, BudgetError::UnknownLineItem(code) if code == "DC_CATERING"));
    }

    #[test]
    fn test_cost_group_sizes() {
        assert_eq!(DIRECT_COSTS.len(), 14);
        assert_eq!(GENERAL_ADMIN.len(), 12);
    }

    #[test]
    fn test_revenue_type_parse() {
        assert_eq!("MOH".parse::<RevenueTypeCode>().unwrap(), RevenueTypeCode::Moh);
        assert_eq!("REV_TYPE_INSURANCE".parse::<RevenueTypeCode>().unwrap(), RevenueTypeCode::Insurance);
        assert!("GOVERNMENT".parse::<RevenueTypeCode>().is_err());
        assert_eq!(RevenueTypeCode::OtherCredit.line_code(), LineCode::RevTypeOtherCredit);
    }
}
