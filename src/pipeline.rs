//! Query compilation pipeline
//!
//! parse → build algebra → push selections → push projections → build
//! operator graph → plan. Every stage after parsing is total, so a query
//! that parses always compiles.

use crate::algebra::{AlgebraBuilder, AlgebraExpr};
use crate::catalog::SchemaCatalog;
use crate::error::Result;
use crate::graph::{GraphBuilder, OperatorGraph};
use crate::optimizer::{HeuristicOptimizer, OptimizerConfig};
use crate::planner::{ExecutionPlan, ExecutionPlanner};
use crate::sql::{ParsedQuery, Parser, ParserConfig};
use serde::Serialize;
use tracing::{debug, info};

/// Configuration for every configurable stage
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub parser: ParserConfig,
    pub optimizer: OptimizerConfig,
}

impl PipelineConfig {
    /// Create a new pipeline config with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    pub fn optimizer(mut self, optimizer: OptimizerConfig) -> Self {
        self.optimizer = optimizer;
        self
    }
}

/// Output of every stage for one query
#[derive(Debug, Clone, Serialize)]
pub struct CompiledQuery {
    pub parsed: ParsedQuery,
    pub initial: AlgebraExpr,
    /// After selection pushdown only
    pub selections_pushed: AlgebraExpr,
    pub optimized: AlgebraExpr,
    pub graph: OperatorGraph,
    pub plan: ExecutionPlan,
}

impl CompiledQuery {
    /// Human-readable rendering of all stages
    pub fn report(&self) -> String {
        let mut out = String::new();
        section(&mut out, "INITIAL ALGEBRA", &self.initial.to_linear_string());
        section(
            &mut out,
            "AFTER SELECTION PUSHDOWN",
            &self.selections_pushed.to_linear_string(),
        );
        section(&mut out, "OPTIMIZED ALGEBRA", &self.optimized.to_linear_string());
        section(&mut out, "OPERATOR GRAPH", self.graph.to_string().trim_end());
        out.push_str(&self.plan.to_string());
        out
    }
}

fn section(out: &mut String, title: &str, body: &str) {
    out.push_str(title);
    out.push('\n');
    out.push_str(&"-".repeat(title.chars().count()));
    out.push('\n');
    out.push_str(body);
    out.push_str("\n\n");
}

/// Compiles query text against a schema catalog
pub struct QueryPipeline<'a> {
    catalog: &'a dyn SchemaCatalog,
    config: PipelineConfig,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(catalog: &'a dyn SchemaCatalog) -> Self {
        Self::with_config(catalog, PipelineConfig::default())
    }

    pub fn with_config(catalog: &'a dyn SchemaCatalog, config: PipelineConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parse and validate only
    pub fn parse(&self, sql: &str) -> Result<ParsedQuery> {
        Parser::with_config(self.catalog, self.config.parser.clone()).parse(sql)
    }

    /// Run every stage; fails only with a parser error
    pub fn compile(&self, sql: &str) -> Result<CompiledQuery> {
        let parsed = self.parse(sql)?;

        let initial = AlgebraBuilder::new().build(&parsed);
        debug!(algebra = %initial.to_linear_string(), "initial algebra");

        let optimizer = HeuristicOptimizer::with_config(self.config.optimizer.clone());
        let selections_pushed = optimizer.push_selections(&initial);
        let optimized = optimizer.push_projections(&selections_pushed);
        debug!(algebra = %optimized.to_linear_string(), "optimized algebra");

        let graph = GraphBuilder::new().build(&optimized);
        let plan = ExecutionPlanner::new().plan(&graph);

        info!(
            tables = parsed.tables().len(),
            nodes = graph.node_count(),
            steps = plan.len(),
            "compiled query"
        );

        Ok(CompiledQuery {
            parsed,
            initial,
            selections_pushed,
            optimized,
            graph,
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::ErrorKind;
    use crate::optimizer::UnattributedPredicates;

    const SCENARIO: &str = "SELECT Produto.Nome, Categoria.Descricao FROM Produto \
                            JOIN Categoria ON Produto.Categoria_idCategoria = Categoria.idCategoria \
                            WHERE Produto.Preco > 100";

    #[test]
    fn test_compile_scenario() {
        let catalog = Catalog::store_schema();
        let compiled = QueryPipeline::new(&catalog).compile(SCENARIO).unwrap();

        assert_eq!(compiled.parsed.tables(), vec!["Produto", "Categoria"]);
        assert_eq!(compiled.graph.node_count(), 7);
        assert_eq!(compiled.plan.len(), 7);
        assert_eq!(
            compiled.plan.final_step().map(|s| s.operation.as_str()),
            Some("apply projection")
        );
    }

    #[test]
    fn test_compile_rejects_unknown_table() {
        let catalog = Catalog::store_schema();
        let err = QueryPipeline::new(&catalog)
            .compile("SELECT x FROM NoSuchTable")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownTable);
        assert!(err.to_string().contains("NoSuchTable"));
    }

    #[test]
    fn test_config_reaches_optimizer() {
        let catalog = Catalog::store_schema();
        let sql = "SELECT Produto.Nome FROM Produto \
                   JOIN Categoria ON Produto.Categoria_idCategoria = Categoria.idCategoria \
                   WHERE Produto.Preco > Categoria.idCategoria";

        let retained = QueryPipeline::new(&catalog).compile(sql).unwrap();
        assert!(retained
            .selections_pushed
            .to_string()
            .contains("Produto.Preco > Categoria.idCategoria"));

        let config = PipelineConfig::new().optimizer(
            OptimizerConfig::new().unattributed_predicates(UnattributedPredicates::Drop),
        );
        let dropped = QueryPipeline::with_config(&catalog, config)
            .compile(sql)
            .unwrap();
        assert!(!dropped
            .selections_pushed
            .to_string()
            .contains("Produto.Preco > Categoria.idCategoria"));
    }

    #[test]
    fn test_report_sections() {
        let catalog = Catalog::store_schema();
        let report = QueryPipeline::new(&catalog)
            .compile(SCENARIO)
            .unwrap()
            .report();

        for title in [
            "INITIAL ALGEBRA",
            "AFTER SELECTION PUSHDOWN",
            "OPTIMIZED ALGEBRA",
            "OPERATOR GRAPH",
            "EXECUTION PLAN",
        ] {
            assert!(report.contains(title), "missing {}", title);
        }
    }

    #[test]
    fn test_compiled_query_serializes() {
        let catalog = Catalog::store_schema();
        let compiled = QueryPipeline::new(&catalog).compile(SCENARIO).unwrap();
        let json = serde_json::to_value(&compiled).unwrap();

        assert_eq!(json["parsed"]["where"], "Produto.Preco > 100");
        assert_eq!(json["optimized"]["op"], "projection");
        assert_eq!(json["plan"]["steps"][0]["operation"], "table scan");
    }
}
