//! Backend listing.

use anyhow::Result;
use console::style;

use super::common::BackendSet;

/// Print every registered backend with its status and queue.
pub async fn execute(backends: &BackendSet) -> Result<()> {
    println!("{} Available backends:\n", style("qdimer").cyan().bold());

    for name in backends.names() {
        let backend = match backends.resolve(&name).await {
            Ok(backend) => backend,
            Err(e) => {
                println!("  {} {} ({e})", style("○").dim(), style(&name).dim());
                continue;
            }
        };

        let caps = backend.capabilities();
        let availability = backend.availability().await;
        let (marker, status) = match &availability {
            Ok(a) if a.is_available => (
                style("●").green(),
                match a.queue_depth {
                    Some(depth) => format!("{depth} pending jobs"),
                    None => "online".to_string(),
                },
            ),
            Ok(a) => (
                style("○").yellow(),
                a.status_message
                    .clone()
                    .unwrap_or_else(|| "offline or maintenance".to_string()),
            ),
            Err(e) => (style("○").red(), e.to_string()),
        };

        println!(
            "  {} {} {}",
            marker,
            style(&name).bold(),
            if caps.is_simulator { "(simulator)" } else { "" }
        );
        println!("    Qubits: {}", caps.num_qubits);
        println!("    Max shots: {}", caps.max_shots);
        println!("    Status: {status}");
        println!();
    }

    Ok(())
}
