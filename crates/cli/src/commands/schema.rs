use anyhow::Result;
use pipewright_core::configs::PipelineConfig;

pub fn execute() -> Result<()> {
    let schema = schemars::schema_for!(PipelineConfig);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
