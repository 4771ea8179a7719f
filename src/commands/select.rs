use crate::commands::Out;
use crate::{Config, Result};
use serde::Serialize;

/// The configured salespeople and which of them is active.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Salespeople {
    pub active: String,
    pub salespeople: Vec<String>,
}

/// Makes `salesperson` the active one when given, otherwise lists the salespeople.
pub async fn select(mut config: Config, salesperson: Option<&str>) -> Result<Out<Salespeople>> {
    let message = match salesperson {
        Some(salesperson) => {
            config.set_active_salesperson(salesperson).await?;
            format!("The active salesperson is now {}", config.active_salesperson())
        }
        None => {
            let lines: Vec<String> = config
                .salespeople()
                .iter()
                .map(|s| {
                    let marker = if s == config.active_salesperson() { "*" } else { " " };
                    format!("{marker} {s}")
                })
                .collect();
            format!("Salespeople:\n{}", lines.join("\n"))
        }
    };
    let structure = Salespeople {
        active: config.active_salesperson().to_string(),
        salespeople: config.salespeople().to_vec(),
    };
    Ok(Out::new(message, structure))
}
