use serde::Serialize;
use shelf_core::entities::{Holding, Loan, Reservation};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct HoldingDetailResponse {
    holding: Holding,
    reservations: Vec<Reservation>,
    loans: Vec<Loan>,
}

pub async fn run(identifier: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let holding = ctx.service.get_holding(identifier).await?;
    let reservations = ctx.service.reservations_for_holding(identifier).await?;
    let loans = ctx.service.loans_for_holding(identifier).await?;

    output(
        &HoldingDetailResponse {
            holding,
            reservations,
            loans,
        },
        flags.format,
    )
}
