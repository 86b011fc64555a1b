use estimator_core::storage::{Customer, CustomerFields};

use crate::app::AppContext;
use crate::cli::{
    ContactArgs, CustomerAddArgs, CustomerDeleteArgs, CustomerEditArgs, CustomerRefArgs,
};
use crate::helpers::{confirm_or_cancel, edited, non_empty, resolve_customer};
use crate::output::{print_receipt, timestamps};
use crate::ui::{header, kv, print, short_id, table, Column};

fn contact_fields(first_name: String, last_name: String, contact: &ContactArgs) -> CustomerFields {
    CustomerFields {
        first_name,
        last_name,
        email: non_empty(contact.email.as_deref()),
        phone: non_empty(contact.phone.as_deref()),
        address: non_empty(contact.address.as_deref()),
        city: non_empty(contact.city.as_deref()),
        state: non_empty(contact.state.as_deref()),
        zip: non_empty(contact.zip.as_deref()),
        notes: non_empty(contact.notes.as_deref()),
    }
}

pub fn handle_add(ctx: &AppContext, args: &CustomerAddArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;

    let fields = contact_fields(args.first.clone(), args.last.clone(), &args.contact);
    let id = service.create_customer(&session, &fields)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        let customer = service.get_customer(&id)?;
        println!("{}", serde_json::to_string_pretty(&customer)?);
    } else if !ctx.quiet() {
        print_receipt(
            &ui_ctx,
            "Customer added",
            &[
                ("ID", id.to_string()),
                ("Name", format!("{} {}", fields.first_name.trim(), fields.last_name.trim())),
            ],
        )?;
    }
    Ok(())
}

pub fn handle_list(ctx: &AppContext) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let customers = service.list_customers()?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&customers)?);
        return Ok(());
    }

    if customers.is_empty() {
        if !ctx.quiet() {
            print(&ui_ctx, "No customers found.");
        }
        return Ok(());
    }

    let pretty = ui_ctx.mode.is_pretty();
    let rows: Vec<Vec<String>> = customers
        .iter()
        .map(|c| {
            vec![
                if pretty {
                    short_id(&c.id)
                } else {
                    c.id.to_string()
                },
                c.full_name(),
                c.email.clone().unwrap_or_default(),
                c.phone.clone().unwrap_or_default(),
                c.city.clone().unwrap_or_default(),
            ]
        })
        .collect();

    if pretty {
        println!("{}", header(&ui_ctx, "customers", Some(&customers.len().to_string())));
    }
    println!(
        "{}",
        table(
            &ui_ctx,
            &[
                Column::new("ID"),
                Column::new("Name"),
                Column::new("Email"),
                Column::new("Phone"),
                Column::new("City"),
            ],
            &rows,
        )
    );
    Ok(())
}

pub fn handle_show(ctx: &AppContext, args: &CustomerRefArgs) -> anyhow::Result<()> {
    let service = ctx.open_service()?;
    let customer = resolve_customer(&service, &args.customer)?;

    let ui_ctx = ctx.ui_context();
    if ui_ctx.mode.is_json() {
        println!("{}", serde_json::to_string_pretty(&customer)?);
        return Ok(());
    }

    if ui_ctx.mode.is_pretty() {
        println!("{}", header(&ui_ctx, "customer", Some(&customer.full_name())));
    }
    for (key, value) in customer_lines(&customer) {
        println!("{}", kv(&ui_ctx, key, &value));
    }
    for (key, value) in timestamps(&ui_ctx, &customer.created_at, &customer.updated_at) {
        println!("{}", kv(&ui_ctx, key, &value));
    }
    Ok(())
}

fn customer_lines(customer: &Customer) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        ("ID", customer.id.to_string()),
        ("First name", customer.first_name.clone()),
        ("Last name", customer.last_name.clone()),
    ];
    let optional = [
        ("Email", &customer.email),
        ("Phone", &customer.phone),
        ("Address", &customer.address),
        ("City", &customer.city),
        ("State", &customer.state),
        ("Zip", &customer.zip),
        ("Notes", &customer.notes),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            lines.push((key, value.clone()));
        }
    }
    lines
}

pub fn handle_edit(ctx: &AppContext, args: &CustomerEditArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let current = resolve_customer(&service, &args.customer)?;

    let contact = &args.contact;
    let fields = CustomerFields {
        first_name: args
            .first
            .clone()
            .unwrap_or_else(|| current.first_name.clone()),
        last_name: args
            .last
            .clone()
            .unwrap_or_else(|| current.last_name.clone()),
        email: edited(&current.email, contact.email.as_deref()),
        phone: edited(&current.phone, contact.phone.as_deref()),
        address: edited(&current.address, contact.address.as_deref()),
        city: edited(&current.city, contact.city.as_deref()),
        state: edited(&current.state, contact.state.as_deref()),
        zip: edited(&current.zip, contact.zip.as_deref()),
        notes: edited(&current.notes, contact.notes.as_deref()),
    };
    service.update_customer(&session, &current.id, &fields)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            "Customer updated",
            &[("ID", current.id.to_string())],
        )?;
    }
    Ok(())
}

pub fn handle_delete(ctx: &AppContext, args: &CustomerDeleteArgs) -> anyhow::Result<()> {
    let mut service = ctx.open_service()?;
    let session = ctx.session()?;
    let customer = resolve_customer(&service, &args.customer)?;

    let prompt = format!("Delete customer '{}'?", customer.full_name());
    if !confirm_or_cancel(ctx, args.force, &prompt)? {
        return Ok(());
    }

    service.delete_customer(&session, &customer.id)?;

    if !ctx.quiet() {
        print_receipt(
            &ctx.ui_context(),
            &format!("Deleted customer '{}'", customer.full_name()),
            &[("Deleted", customer.id.to_string())],
        )?;
    }
    Ok(())
}
