use backpack::codec::content;
use backpack::config::{AppConfig, TemplateConfig};
use backpack::telemetry::logging;
use backpack::{factory, PreviewCache};

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    let config = AppConfig::from_args(&args)?;
    if let Some(log_root) = &config.log_root {
        logging::init(log_root)?;
    }

    let templates = TemplateConfig::load(&config.templates_path)?;
    let mut issues = templates.validate();
    let mut cache = PreviewCache::new(templates.templates.len().max(1));

    println!("backpack: template validation");
    println!("- config: {}", config.templates_path.display());
    println!("- templates: {}", templates.templates.len());

    for template in &templates.templates {
        match factory::create_from_template(template) {
            Ok(item) => match content::decode(&item) {
                Ok(slots) => {
                    let summary = cache
                        .summarize(&item)
                        .map(|summary| format!("occupied={}", summary.occupied))
                        .unwrap_or_else(|err| format!("summary failed: {}", err));
                    println!(
                        "- {}: rows={} capacity={} {}",
                        template.name,
                        template.rows,
                        slots.len(),
                        summary
                    );
                }
                Err(err) => {
                    issues.push(format!("template '{}' decode failed: {}", template.name, err));
                }
            },
            Err(err) => {
                issues.push(format!("template '{}' create failed: {}", template.name, err));
            }
        }
    }

    if issues.is_empty() {
        println!("- result: ok");
        return Ok(());
    }
    for issue in &issues {
        eprintln!("backpack: validate {}", issue);
        logging::log_error(issue);
    }
    Err(format!("{} template problem(s) found", issues.len()))
}
