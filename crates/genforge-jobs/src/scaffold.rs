//! Built-in deterministic generator.
//!
//! Derives a domain name from the requirement text and emits the
//! standard four-artifact set (entity, service, controller, schema).
//! Useful as the default collaborator and as the baseline the external
//! AI generator is expected to at least match.

use async_trait::async_trait;
use genforge_core::domain::artifact::{Artifact, ArtifactKind, GenerationOutput};
use tracing::debug;

use crate::generator::{CodeGenerator, GenerationContext};

const FALLBACK_DOMAIN: &str = "Item";

#[derive(Debug, Default)]
pub struct ScaffoldGenerator;

impl ScaffoldGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeGenerator for ScaffoldGenerator {
    async fn generate(&self, ctx: &GenerationContext) -> genforge_core::Result<GenerationOutput> {
        let type_name = domain_type_name(&ctx.requirement);
        let var_name = lower_first(&type_name);
        debug!(job_id = %ctx.job_id, round = ctx.round, domain = %type_name, "scaffolding artifact set");

        let schema = match (&ctx.frozen_schema, ctx.contract_locked) {
            (Some(frozen), true) => frozen.clone(),
            _ => Artifact::new(
                "schema.sql",
                ArtifactKind::Schema,
                schema_script(&var_name),
            ),
        };

        Ok(GenerationOutput {
            artifacts: vec![
                Artifact::new(
                    format!("{type_name}.java"),
                    ArtifactKind::Entity,
                    entity_unit(&type_name),
                ),
                Artifact::new(
                    format!("{type_name}Service.java"),
                    ArtifactKind::Service,
                    service_unit(&type_name, &var_name),
                ),
                Artifact::new(
                    format!("{type_name}Controller.java"),
                    ArtifactKind::Controller,
                    controller_unit(&type_name, &var_name),
                ),
                schema,
            ],
        })
    }
}

/// First alphabetic word of the requirement, capitalized. "order
/// management system" becomes `Order`.
fn domain_type_name(requirement: &str) -> String {
    let word = requirement
        .split(|c: char| !c.is_ascii_alphabetic())
        .find(|w| !w.is_empty());
    match word {
        Some(w) => {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => FALLBACK_DOMAIN.to_string(),
            }
        }
        None => FALLBACK_DOMAIN.to_string(),
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => name.to_string(),
    }
}

fn entity_unit(type_name: &str) -> String {
    format!(
        r#"package com.genforge.generated.entity;

public class {type_name} {{
    private String id;
    private String name;

    public String getId() {{
        return id;
    }}

    public void setId(String id) {{
        this.id = id;
    }}

    public String getName() {{
        return name;
    }}

    public void setName(String name) {{
        this.name = name;
    }}
}}
"#
    )
}

fn service_unit(type_name: &str, var_name: &str) -> String {
    format!(
        r#"package com.genforge.generated.service;

public class {type_name}Service {{
    private final {type_name}Repository {var_name}Repository;

    public {type_name}Service({type_name}Repository {var_name}Repository) {{
        this.{var_name}Repository = {var_name}Repository;
    }}

    public {type_name} find(String id) {{
        if (id == null || id.isEmpty()) {{
            throw new IllegalArgumentException("id required");
        }}
        return {var_name}Repository.findById(id);
    }}

    public {type_name} save({type_name} {var_name}) {{
        if ({var_name} == null) {{
            throw new IllegalArgumentException("payload required");
        }}
        return {var_name}Repository.save({var_name});
    }}
}}
"#
    )
}

fn controller_unit(type_name: &str, var_name: &str) -> String {
    format!(
        r#"package com.genforge.generated.controller;

public class {type_name}Controller {{
    private {type_name}Service service;

    public {type_name} get(String id) {{
        if (id == null) {{
            throw new IllegalArgumentException("id required");
        }}
        return service.find(id);
    }}

    public {type_name} create({type_name} {var_name}) {{
        if ({var_name} == null) {{
            throw new IllegalArgumentException("payload required");
        }}
        return service.save({var_name});
    }}
}}
"#
    )
}

fn schema_script(var_name: &str) -> String {
    format!(
        r#"CREATE TABLE {var_name}s (
    id VARCHAR(64) PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#
    )
}
