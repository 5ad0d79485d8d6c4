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

use {
	clap::Parser,
	log::LevelFilter,
	std::path::PathBuf,
	vksgen::*
};

/// Generates a Go (cgo) wrapper and dynamic-loading C glue from the Vulkan registry.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// YAML configuration, the defaults are used if absent
	#[arg(short, long)]
	config: Option<PathBuf>,

	/// Path of `vk.xml`
	#[arg(short, long)]
	registry: Option<PathBuf>,

	/// File stem of the generated files
	#[arg(short, long)]
	output: Option<String>,

	/// Go package name
	#[arg(short, long)]
	package: Option<String>,

	/// Value of the `api` attributes to keep
	#[arg(long)]
	api: Option<String>,

	/// Feature to enable, replaces the configured features
	#[arg(short, long)]
	feature: Vec<String>,

	/// Extension to enable, replaces the configured extensions
	#[arg(short, long)]
	extension: Vec<String>,

	/// Directory the files are written to
	#[arg(short, long, default_value = ".")]
	dir: PathBuf,

	/// More output, may be repeated
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,

	/// Only log errors
	#[arg(short, long)]
	quiet: bool
}

impl Args {
	fn level(&self) -> LevelFilter {
		match (self.quiet, self.verbose) {
			(true, _) => LevelFilter::Error,
			(_, 0) => LevelFilter::Info,
			(_, 1) => LevelFilter::Debug,
			_ => LevelFilter::Trace
		}
	}

	fn config(&self) -> Result<Config> {
		let mut config = match &self.config {
			Some(path) => Config::load(path)?,
			None => Config::default()
		};

		if let Some(v) = &self.registry {
			config.registry = v.clone();
		}

		if let Some(v) = &self.output {
			config.output_name = v.clone();
		}

		if let Some(v) = &self.package {
			config.package_name = v.clone();
		}

		if let Some(v) = &self.api {
			config.api = v.clone();
		}

		if !self.feature.is_empty() {
			config.features = self.feature.clone();
		}

		if !self.extension.is_empty() {
			config.extensions = self.extension.clone();
		}

		Ok(config)
	}
}

fn main() {
	let args = Args::parse();

	let mut builder = pretty_env_logger::formatted_builder();
	builder.filter_level(args.level());
	if let Ok(filters) = std::env::var("RUST_LOG") {
		builder.parse_filters(&filters);
	}
	builder.init();

	if let Err(e) = args.config().and_then(|config| generate(&config, &args.dir)) {
		log::error!("{}", e);
		std::process::exit(1);
	}
}
