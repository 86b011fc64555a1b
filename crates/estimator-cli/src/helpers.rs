//! Lookup and input helpers shared by command handlers.

use dialoguer::Confirm;
use uuid::Uuid;

use estimator_core::storage::{Customer, Estimate, EstimateFile, EstimateFilter, LineItem};

use crate::app::{AppContext, Service};
use crate::errors::CliError;
use crate::ui::{badge, Badge, OutputMode};

/// Match a UUID or a unique prefix of one against candidates.
fn match_reference<T>(
    kind: &str,
    reference: &str,
    candidates: Vec<T>,
    id_of: impl Fn(&T) -> Uuid,
    hint: &str,
) -> anyhow::Result<T> {
    let reference = reference.trim().to_lowercase();
    if reference.is_empty() {
        return Err(CliError::invalid_input(format!("{} ID is required", kind)).into());
    }

    let mut matches: Vec<T> = candidates
        .into_iter()
        .filter(|candidate| id_of(candidate).to_string().starts_with(&reference))
        .collect();

    match matches.len() {
        0 => Err(CliError::not_found(
            format!("{} {} not found", kind, reference),
            format!("Hint: {}", hint),
        )
        .into()),
        1 => Ok(matches.remove(0)),
        n => Err(CliError::invalid_input(format!(
            "{} ID prefix '{}' is ambiguous ({} matches); use more characters",
            kind, reference, n
        ))
        .into()),
    }
}

/// Resolve an estimate by UUID or unique prefix.
pub fn resolve_estimate(service: &Service, reference: &str) -> anyhow::Result<Estimate> {
    if let Ok(id) = Uuid::parse_str(reference.trim()) {
        return Ok(service.get_estimate(&id)?);
    }
    let estimates = service.list_estimates(&EstimateFilter::new())?;
    match_reference(
        "Estimate",
        reference,
        estimates,
        |e| e.id,
        "Run `estimator estimate list` to find estimate IDs.",
    )
}

/// Resolve a line item of `estimate_id` by UUID or unique prefix.
pub fn resolve_line_item(
    service: &Service,
    estimate_id: &Uuid,
    reference: &str,
) -> anyhow::Result<LineItem> {
    if let Ok(id) = Uuid::parse_str(reference.trim()) {
        return Ok(service.get_line_item(estimate_id, &id)?);
    }
    let items = service.list_line_items(estimate_id)?;
    match_reference(
        "Line item",
        reference,
        items,
        |item| item.id,
        "Run `estimator estimate show <ESTIMATE>` to see line item IDs.",
    )
}

/// Resolve an attachment of `estimate_id` by UUID or unique prefix.
pub fn resolve_file(
    service: &Service,
    estimate_id: &Uuid,
    reference: &str,
) -> anyhow::Result<EstimateFile> {
    if let Ok(id) = Uuid::parse_str(reference.trim()) {
        return Ok(service.get_estimate_file(estimate_id, &id)?);
    }
    let files = service.list_estimate_files(estimate_id)?;
    match_reference(
        "File",
        reference,
        files,
        |file| file.id,
        "Run `estimator file list <ESTIMATE>` to see file IDs.",
    )
}

/// Resolve a customer by UUID or unique prefix.
pub fn resolve_customer(service: &Service, reference: &str) -> anyhow::Result<Customer> {
    if let Ok(id) = Uuid::parse_str(reference.trim()) {
        return Ok(service.get_customer(&id)?);
    }
    let customers = service.list_customers()?;
    match_reference(
        "Customer",
        reference,
        customers,
        |c| c.id,
        "Run `estimator customer list` to find customer IDs.",
    )
}

/// Parse a core string enum, mapping the error to invalid input.
pub fn parse_choice<T>(value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr<Err = estimator_core::EstimatorError>,
{
    value
        .parse::<T>()
        .map_err(|e| CliError::invalid_input(e.to_string()).into())
}

/// Trim optional text; blank becomes `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Apply an edit flag to an existing optional value.
///
/// Flag absent keeps `current`; an empty flag clears it.
pub fn edited(current: &Option<String>, flag: Option<&str>) -> Option<String> {
    match flag {
        Some(value) => non_empty(Some(value)),
        None => current.clone(),
    }
}

/// Ask before a destructive action unless `force` is set.
///
/// Returns `false` (after printing the cancellation) when the user declines.
pub fn confirm_or_cancel(ctx: &AppContext, force: bool, prompt: &str) -> anyhow::Result<bool> {
    if force {
        return Ok(true);
    }

    let ui_ctx = ctx.ui_context();
    if !ui_ctx.is_interactive() {
        return Err(CliError::invalid_input(format!(
            "{} Refusing without a terminal; pass --force to confirm.",
            prompt
        ))
        .into());
    }

    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;

    if !confirmed && !ctx.quiet() {
        match ui_ctx.mode {
            OutputMode::Pretty => println!("{}", badge(&ui_ctx, Badge::Warn, "Cancelled")),
            OutputMode::Plain | OutputMode::Json => println!("status=cancelled"),
        }
    }
    Ok(confirmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    use estimator_core::storage::EstimateStatus;

    #[test]
    fn test_match_reference_prefix() {
        let a = Uuid::parse_str("7a2e3c0b-1234-5678-9abc-def012345678").expect("uuid");
        let b = Uuid::parse_str("7a2f0000-1234-5678-9abc-def012345678").expect("uuid");

        let found = match_reference("Estimate", "7A2E", vec![a, b], |id| *id, "list")
            .expect("unique prefix should resolve");
        assert_eq!(found, a);

        let err = match_reference("Estimate", "7a2", vec![a, b], |id| *id, "list")
            .expect_err("shared prefix should be ambiguous");
        assert!(err.to_string().contains("ambiguous"));

        let err = match_reference("Estimate", "ffff", vec![a, b], |id| *id, "list")
            .expect_err("unknown prefix should fail");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_parse_choice_maps_to_invalid_input() {
        let status: EstimateStatus = parse_choice("review").expect("valid status");
        assert_eq!(status, EstimateStatus::Review);

        let err = parse_choice::<EstimateStatus>("pending").expect_err("unknown status");
        assert!(err.downcast_ref::<CliError>().is_some());
    }

    #[test]
    fn test_edited_semantics() {
        let current = Some("old".to_string());
        assert_eq!(edited(&current, None), current);
        assert_eq!(edited(&current, Some("  ")), None);
        assert_eq!(edited(&current, Some(" new ")), Some("new".to_string()));
    }
}
