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

//! Writers of the Go wrapper module, the C header and the C implementation.

mod cdefine;
mod cimplement;
mod golang;

pub use self::{cdefine::gen_c_header, cimplement::gen_c_impl, golang::gen_go};

use {
	crate::{config::Config, graph::RegistryGraph, parse::TypeCategory, translate::*},
	std::collections::HashSet
};

/// The commands the C wrappers and the proc address table are generated for.
pub fn commands(items: &[Item]) -> impl Iterator<Item = &CommandData> {
	items.iter().filter_map(|v| match v {
		Item::Command(v) => Some(v),
		_ => None
	})
}

fn handle_parent<'a>(graph: &'a RegistryGraph, name: &str) -> Option<Option<&'a str>> {
	graph.get(name)
		.and_then(|v| v.as_type())
		.filter(|v| v.category == TypeCategory::Handle)
		.map(|v| v.parents().next())
}

/// Handles whose commands become methods of a Go facade: the first parameter of every
/// command that isn't global, and the parents of those handles.
pub fn determine_facades(graph: &RegistryGraph, config: &Config, items: &[Item]) -> HashSet<String> {
	let mut facades = HashSet::new();

	for command in commands(items).filter(|v| !config.is_global_proc(&v.name.c())) {
		let mut current = command.params.first().map(|v| v.type_name.as_str());
		while let Some(name) = current {
			match handle_parent(graph, name) {
				Some(parent) if facades.insert(name.to_string()) => current = parent,
				_ => break
			}
		}
	}

	log::debug!("{} handles need a facade", facades.len());
	facades
}

/// `RET name(vksProcAddr* addrs, T0 p0, ...)`
fn c_signature(command: &CommandData) -> String {
	let params = command.params.iter()
		.map(|p| format!(", {}", p.ty.c_param(&p.name.c())))
		.collect::<String>();
	format!("{} {}(vksProcAddr* addrs{})", command.ret.c(), command.name.c(), params)
}

#[cfg(test)]
mod tests {
	use {super::*, crate::*};

	pub(super) fn fixture() -> (RegistryGraph, Config, Vec<Item>) {
		let config = Config {
			features:   vec!["VK_VERSION_1_0".to_string(), "VK_VERSION_1_1".to_string()],
			extensions: vec!["VK_KHR_surface".to_string(), "VK_KHR_swapchain".to_string()],
			..Config::default()
		};
		let registry = xml::deserialize::<Registry, _>(include_str!("../tests/data/mini_vk.xml").as_bytes())
			.unwrap()
			.for_api(&config.api);
		let graph = build_graph(&registry, &config).unwrap();
		let order = graph.emission_order(&config.enabled());
		let items = translate::build_items(&graph, &config, &order);
		(graph, config, items)
	}

	pub(super) fn command<'a>(items: &'a [Item], name: &str) -> &'a CommandData {
		commands(items)
			.find(|v| v.name.c() == name)
			.unwrap_or_else(|| panic!("`{}` is not emitted", name))
	}

	#[test]
	fn follows_handle_parents() {
		let (graph, config, items) = fixture();
		let mut facades = determine_facades(&graph, &config, &items).into_iter().collect::<Vec<_>>();
		facades.sort();
		assert_eq!(facades, vec!["VkDevice", "VkInstance", "VkPhysicalDevice", "VkQueue"]);
	}

	#[test]
	fn global_commands_need_no_facade() {
		let (graph, mut config, items) = fixture();
		config.global_procs.extend(commands(&items).map(|v| v.name.c()));
		assert!(determine_facades(&graph, &config, &items).is_empty());
	}

	#[test]
	fn writes_c_signatures() {
		let (_, _, items) = fixture();
		assert_eq!(
			c_signature(command(&items, "vkCreateInstance")),
			"VkResult vkCreateInstance(vksProcAddr* addrs, VkInstanceCreateInfo* pCreateInfo, VkInstance* pInstance)"
		);
		assert_eq!(
			c_signature(command(&items, "vkDestroyInstance")),
			"void vkDestroyInstance(vksProcAddr* addrs, VkInstance instance)"
		);
		assert_eq!(
			c_signature(command(&items, "vkGetInstanceProcAddr")),
			"PFN_vkVoidFunction vkGetInstanceProcAddr(vksProcAddr* addrs, VkInstance instance, char* pName)"
		);
	}
}
