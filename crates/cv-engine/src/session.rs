//! One render session: a measure registry pinned to a fixed `as_of` instant,
//! plus the load-then-render pipeline.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use cv_chart::{
    render_chain_graph, render_option_state, to_svg, ChainGraph, DrawList, MeasureRegistry,
};
use cv_data::ChainLoader;
use cv_types::{validation_error, Chain, ChainSide, CvResult, OptionPosition, PlotRange};

use crate::config::{OutputFormat, RenderConfig};

/// Renders charts against a registry built once for a fixed `as_of`.
#[derive(Debug)]
pub struct RenderSession {
    registry: MeasureRegistry,
}

impl RenderSession {
    /// Session with the built-in measures.
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self {
            registry: MeasureRegistry::with_builtins(as_of),
        }
    }

    /// Session over a caller-assembled registry.
    pub fn with_registry(registry: MeasureRegistry) -> Self {
        Self { registry }
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.registry.as_of()
    }

    pub fn registry(&self) -> &MeasureRegistry {
        &self.registry
    }

    /// Chain graph for the named measure. An unknown name fails before any
    /// quote is examined.
    pub fn chain_graph(&self, chain: &Chain, side: ChainSide, measure: &str) -> CvResult<ChainGraph> {
        let measure = self.registry.get(measure)?;
        Ok(render_chain_graph(chain, side, measure, self.as_of())?)
    }

    /// Option state glyph. Independent of the registry and `as_of`.
    ///
    /// Every price must be finite; an inverted plot range is allowed and
    /// draws mirrored.
    pub fn option_state(
        &self,
        option: &OptionPosition,
        current_price: f64,
        plot_range: PlotRange,
    ) -> CvResult<DrawList> {
        let prices = [
            ("current price", current_price),
            ("purchase underlying price", option.purchase_underlying_price),
            ("strike price", option.strike_price),
            ("premium", option.premium),
            ("plot range start", plot_range.start),
            ("plot range end", plot_range.end),
        ];
        if let Some((field, value)) = prices.iter().find(|(_, v)| !v.is_finite()) {
            return Err(validation_error!("{} must be finite, got {}", field, value));
        }
        Ok(render_option_state(option, current_price, plot_range))
    }
}

/// What a configured run produced.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// SVG markup or draw-list JSON, per the configured format.
    pub document: String,
    pub strikes: usize,
    pub quotes: usize,
    pub degenerate: bool,
}

/// Load the configured chain, render it, and write the document to the
/// configured output file (if any).
pub async fn run(config: &RenderConfig) -> CvResult<RenderOutput> {
    let as_of = config.resolve_as_of();
    let session = RenderSession::new(as_of);
    // Resolve the measure before fetching anything.
    session.registry().get(&config.measure)?;

    let chain = ChainLoader::new().load(&config.source).await?;
    let graph = session.chain_graph(&chain, config.side, &config.measure)?;
    if graph.is_degenerate() {
        warn!("Nothing to plot from {} as of {}", config.source, as_of);
    }

    let document = match config.format {
        OutputFormat::Svg => to_svg(&graph.draw_list),
        OutputFormat::Json => serde_json::to_string_pretty(&graph.draw_list)?,
    };

    if let Some(path) = &config.output {
        tokio::fs::write(path, &document).await?;
        info!("Wrote {} bytes to {}", document.len(), path.display());
    }

    Ok(RenderOutput {
        strikes: graph.groups.len(),
        quotes: graph.groups.iter().map(|g| g.len()).sum(),
        degenerate: graph.is_degenerate(),
        document,
    })
}
