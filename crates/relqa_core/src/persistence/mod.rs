//! Plan persistence for human review between `match` and `compare`.

mod plan_csv;

pub use plan_csv::{
    read_plan, read_plan_from, write_plan, write_plan_to, PlanError, PlanResult, PLAN_HEADER,
};
