// MIT License
//
// Copyright (c) 2019-2021 Tobias Pfeiffer
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! Generates a Go (cgo) wrapper around the Vulkan API from the XML registry.
//!
//! Three files are written: `<output>.go`, the Go module with a facade per
//! dispatchable handle, `<output>.h`, which declares a table of proc addresses and
//! a C wrapper per command, and `<output>.c`, which loads the Vulkan library at
//! runtime and fills the tables.
//!
//! Example:
//! ```rust
//! use vksgen::*;
//!
//! fn main() -> Result<()> {
//! 	let config = Config::load("vksgen.yaml")?;
//! 	generate(&config, "vks")
//! }
//! ```

use {
	std::{fs::File, io::{self, BufReader, BufWriter, Write}, path::Path}
};

pub use {
	config::Config,
	error::{Error, Result},
	graph::RegistryGraph,
	parse::Registry
};

pub mod config;
pub mod error;
pub mod gen;
pub mod graph;
pub mod parse;
pub mod translate;
pub mod xml;

/// Reads the registry at `path` and keeps only what belongs to `api`.
pub fn load_registry(path: impl AsRef<Path>, api: &str) -> Result<Registry> {
	let path = path.as_ref();
	log::info!("reading registry `{}`", path.display());
	let registry = xml::deserialize::<Registry, _>(BufReader::new(File::open(path)?))?;
	Ok(registry.for_api(api))
}

/// Builds the graph of `registry` with the features and extensions of `config` applied.
pub fn build_graph(registry: &Registry, config: &Config) -> Result<RegistryGraph> {
	let mut graph = RegistryGraph::build(registry, &config.enabled())?;
	config.features.iter().for_each(|v| graph.apply_feature(v));
	config.extensions.iter().for_each(|v| graph.apply_extension(v));
	Ok(graph)
}

/// Writes the Go module, the C header and the C implementation for `registry`.
pub fn generate_to(
	registry: &Registry,
	config:   &Config,
	go:       &mut impl Write,
	header:   &mut impl Write,
	c:        &mut impl Write
) -> Result<()> {
	let graph = build_graph(registry, config)?;
	let order = graph.emission_order(&config.enabled());
	let items = translate::build_items(&graph, config, &order);
	let facades = gen::determine_facades(&graph, config, &items);

	gen::gen_go(go, &items, &facades, config)?;
	gen::gen_c_header(header, &items, config)?;
	gen::gen_c_impl(c, &items, config)?;
	log::info!("generated {} items, {} commands", items.len(), gen::commands(&items).count());
	Ok(())
}

fn create(path: &Path) -> io::Result<BufWriter<File>> {
	log::debug!("writing `{}`", path.display());
	File::create(path).map(BufWriter::new)
}

/// Reads the configured registry and writes the three files into `dir`.
pub fn generate(config: &Config, dir: impl AsRef<Path>) -> Result<()> {
	let dir = dir.as_ref();
	let registry = load_registry(&config.registry, &config.api)?;

	let mut go = create(&dir.join(config.go_file()))?;
	let mut header = create(&dir.join(config.header_file()))?;
	let mut c = create(&dir.join(config.c_file()))?;

	generate_to(&registry, config, &mut go, &mut header, &mut c)?;
	go.flush()?;
	header.flush()?;
	c.flush()?;
	Ok(())
}
