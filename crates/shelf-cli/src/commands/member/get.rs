use serde::Serialize;
use shelf_core::entities::Member;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct MemberDetailResponse {
    member: Member,
    active_reservations: u64,
}

pub async fn run(identifier: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let member = ctx.service.get_member(identifier).await?;
    let active_reservations = ctx
        .service
        .count_active_reservations_for_member(identifier)
        .await?;

    output(
        &MemberDetailResponse {
            member,
            active_reservations,
        },
        flags.format,
    )
}
