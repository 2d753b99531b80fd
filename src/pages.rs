//! Catalog of entity pages: what each page lists, filters on, exports, and who sees it.

use std::collections::BTreeSet;

use crate::models::{Account, Department, Fee, Program, Role};
use crate::report::ReportType;
use crate::table::column::{Amount, EnumText, StudentName, Timestamp, YearSection, YesNo};
use crate::table::{Column, FilterKey, FilterOption};

/// A list page backed by one backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Students,
    Fees,
    Payments,
    Remittances,
    Expenses,
    Programs,
    Departments,
    Accounts,
}

impl Entity {
    pub const ALL: [Entity; 8] = [
        Entity::Students,
        Entity::Fees,
        Entity::Payments,
        Entity::Remittances,
        Entity::Expenses,
        Entity::Programs,
        Entity::Departments,
        Entity::Accounts,
    ];

    /// Collection path under the API prefix.
    pub fn path(&self) -> &'static str {
        match self {
            Entity::Students => "/students",
            Entity::Fees => "/fees",
            Entity::Payments => "/payments",
            Entity::Remittances => "/remittances",
            Entity::Expenses => "/expenses",
            Entity::Programs => "/programs",
            Entity::Departments => "/departments",
            Entity::Accounts => "/accounts",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Entity::Students => "Students",
            Entity::Fees => "Fees",
            Entity::Payments => "Payments",
            Entity::Remittances => "Remittances",
            Entity::Expenses => "Expenses",
            Entity::Programs => "Programs",
            Entity::Departments => "Departments",
            Entity::Accounts => "Accounts",
        }
    }

    /// Short line shown on the dashboard card.
    pub fn description(&self) -> &'static str {
        match self {
            Entity::Students => "Enrolled students per program",
            Entity::Fees => "Collectible fees and due dates",
            Entity::Payments => "Fee payments by student",
            Entity::Remittances => "Collections turned over by treasurers",
            Entity::Expenses => "Spending and approvals",
            Entity::Programs => "Degree programs",
            Entity::Departments => "Academic departments",
            Entity::Accounts => "Treasurer and admin accounts",
        }
    }

    /// Report generated from this page, if any.
    pub fn report_type(&self) -> Option<ReportType> {
        match self {
            Entity::Students => Some(ReportType::Student),
            Entity::Payments => Some(ReportType::Payment),
            Entity::Remittances => Some(ReportType::Remittance),
            Entity::Expenses => Some(ReportType::Expense),
            _ => None,
        }
    }

    pub fn columns(&self) -> Vec<Column> {
        let id = Column::new("id", "ID").hidden();
        match self {
            Entity::Students => vec![
                id,
                Column::new("studentNumber", "Student No.").sortable(),
                Column::new("fullName", "Name").with_formatter(StudentName),
                Column::new("programCode", "Program").sortable(),
                Column::new("yearSec", "Year & Section").with_formatter(YearSection),
                Column::new("email", "Email"),
                Column::actions(),
            ],
            Entity::Fees => vec![
                id,
                Column::new("name", "Fee").sortable(),
                Column::new("amount", "Amount").sortable().with_formatter(Amount),
                Column::new("academicYear", "Academic Year").sortable(),
                Column::new("semester", "Semester").with_formatter(EnumText),
                Column::new("dueDate", "Due Date").sortable(),
                Column::actions(),
            ],
            Entity::Payments => vec![
                id,
                Column::new("studentNumber", "Student No.").sortable(),
                Column::new("fullName", "Name").with_formatter(StudentName),
                Column::new("yearSec", "Year & Section").with_formatter(YearSection),
                Column::new("feeName", "Fee"),
                Column::new("amount", "Amount").sortable().with_formatter(Amount),
                Column::new("status", "Status").sortable().with_formatter(EnumText),
                Column::new("paidAt", "Date Paid").sortable().with_formatter(Timestamp),
                Column::actions(),
            ],
            Entity::Remittances => vec![
                id,
                Column::new("feeName", "Fee"),
                Column::new("remittedByName", "Remitted By"),
                Column::new("yearSec", "Year & Section").with_formatter(YearSection),
                Column::new("amount", "Amount").sortable().with_formatter(Amount),
                Column::new("status", "Status").sortable().with_formatter(EnumText),
                Column::new("remittedAt", "Date Remitted").sortable().with_formatter(Timestamp),
                Column::actions(),
            ],
            Entity::Expenses => vec![
                id,
                Column::new("description", "Description").sortable(),
                Column::new("expenseCategory", "Category").sortable().with_formatter(EnumText),
                Column::new("amount", "Amount").sortable().with_formatter(Amount),
                Column::new("paymentMethod", "Payment Method").with_formatter(EnumText),
                Column::new("expenseStatus", "Status").with_formatter(EnumText),
                Column::new("approvalStatus", "Approval").with_formatter(EnumText),
                Column::new("receiptAttached", "Receipt").with_formatter(YesNo),
                Column::new("expenseDate", "Date").sortable(),
                Column::actions(),
            ],
            Entity::Programs => vec![
                id,
                Column::new("code", "Code").sortable(),
                Column::new("name", "Program").sortable(),
                Column::new("departmentName", "Department"),
                Column::actions(),
            ],
            Entity::Departments => vec![
                id,
                Column::new("code", "Code").sortable(),
                Column::new("name", "Department").sortable(),
                Column::actions(),
            ],
            Entity::Accounts => vec![
                id,
                Column::new("username", "Username").sortable(),
                Column::new("fullName", "Name").with_formatter(StudentName),
                Column::new("role", "Role").sortable().with_formatter(EnumText),
                Column::new("yearSec", "Year & Section").with_formatter(YearSection),
                Column::new("active", "Active").with_formatter(YesNo),
                Column::actions(),
            ],
        }
    }

    /// Filters offered above the table, in display order.
    pub fn filter_keys(&self) -> &'static [FilterKey] {
        match self {
            Entity::Students => &[FilterKey::Program, FilterKey::YearLevel, FilterKey::Section],
            Entity::Fees => &[FilterKey::AcademicYear, FilterKey::Semester, FilterKey::DepartmentId],
            Entity::Payments => &[
                FilterKey::FeeType,
                FilterKey::Program,
                FilterKey::YearLevel,
                FilterKey::Section,
                FilterKey::Status,
            ],
            Entity::Remittances => &[
                FilterKey::FeeType,
                FilterKey::RemittedBy,
                FilterKey::Program,
                FilterKey::YearLevel,
                FilterKey::Section,
                FilterKey::Status,
            ],
            Entity::Expenses => &[
                FilterKey::ExpenseCategory,
                FilterKey::ApprovalStatus,
                FilterKey::DepartmentId,
            ],
            Entity::Programs => &[FilterKey::DepartmentId],
            Entity::Departments => &[],
            Entity::Accounts => &[FilterKey::Program],
        }
    }

    /// Choices that do not come from the backend.
    pub fn static_options(&self, key: FilterKey) -> Vec<FilterOption> {
        let enum_options = |values: &[&str]| -> Vec<FilterOption> {
            values
                .iter()
                .map(|v| FilterOption::new(*v, v.replace('_', " ")))
                .collect()
        };
        match key {
            FilterKey::YearLevel => (1..=4).map(|y| FilterOption::plain(y.to_string())).collect(),
            FilterKey::Section => ["A", "B", "C", "D", "E"].into_iter().map(FilterOption::plain).collect(),
            FilterKey::Semester => enum_options(&["FIRST", "SECOND", "SUMMER"]),
            FilterKey::ApprovalStatus => enum_options(&["PENDING", "APPROVED", "REJECTED"]),
            FilterKey::ExpenseCategory => enum_options(&[
                "OFFICE_SUPPLIES",
                "TRANSPORTATION",
                "FOOD",
                "EVENTS",
                "EQUIPMENT",
                "MISCELLANEOUS",
            ]),
            FilterKey::Status => match self {
                Entity::Payments => enum_options(&["PAID", "PENDING", "PARTIAL"]),
                Entity::Remittances => enum_options(&["COMPLETED", "PARTIAL", "NOT_REMITTED"]),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    /// Whether a user with `role` may open this page.
    pub fn visible_to(&self, role: Role) -> bool {
        match role {
            Role::Admin => true,
            Role::OrgTreasurer => matches!(
                self,
                Entity::Students | Entity::Payments | Entity::Remittances | Entity::Fees | Entity::Expenses
            ),
            Role::ClassTreasurer => matches!(self, Entity::Students | Entity::Payments | Entity::Remittances),
            Role::Student => matches!(self, Entity::Fees | Entity::Expenses),
        }
    }

    /// Whether `role` may delete rows on this page.
    pub fn deletable_by(&self, role: Role) -> bool {
        match self {
            Entity::Fees | Entity::Expenses => matches!(role, Role::Admin | Role::OrgTreasurer),
            Entity::Payments | Entity::Students => {
                matches!(role, Role::Admin | Role::OrgTreasurer | Role::ClassTreasurer)
            }
            Entity::Remittances | Entity::Programs | Entity::Departments | Entity::Accounts => role == Role::Admin,
        }
    }

    /// Pages a role can navigate to, in catalog order.
    pub fn visible_for(role: Role) -> Vec<Entity> {
        Entity::ALL.into_iter().filter(|e| e.visible_to(role)).collect()
    }
}

/// Fee type choices plus the distinct academic years the fees span.
pub fn fee_options(fees: &[Fee]) -> Vec<(FilterKey, Vec<FilterOption>)> {
    let types = fees
        .iter()
        .filter_map(|fee| fee.id.map(|id| FilterOption::new(id.to_string(), &fee.name)))
        .collect();
    let years: BTreeSet<&str> = fees.iter().filter_map(|fee| fee.academic_year.as_deref()).collect();

    vec![
        (FilterKey::FeeType, types),
        (FilterKey::AcademicYear, years.into_iter().map(FilterOption::plain).collect()),
    ]
}

/// Program choices keyed by program code.
pub fn program_options(programs: &[Program]) -> Vec<FilterOption> {
    programs.iter().map(|p| FilterOption::plain(p.option_label())).collect()
}

pub fn department_options(departments: &[Department]) -> Vec<FilterOption> {
    departments
        .iter()
        .filter_map(|d| d.id.map(|id| FilterOption::new(id.to_string(), &d.name)))
        .collect()
}

/// "Remitted by" choices: active accounts only.
pub fn account_options(accounts: &[Account]) -> Vec<FilterOption> {
    accounts
        .iter()
        .filter(|a| a.active)
        .filter_map(|a| a.id.map(|id| FilterOption::new(id.to_string(), a.option_label())))
        .collect()
}
