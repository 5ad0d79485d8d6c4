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

//! Generator configuration, read from a YAML file.
//!
//! ```yaml
//! registry: /usr/share/vulkan/registry/vk.xml
//! output_name: vk_wrapper
//! package_name: vks
//! features: [VK_VERSION_1_0, VK_VERSION_1_1]
//! extensions: [VK_KHR_surface, VK_KHR_swapchain]
//! ```

use {
	crate::error::Result,
	serde::Deserialize,
	std::{collections::BTreeMap, fs::File, io::BufReader, path::{Path, PathBuf}}
};

pub const DEFAULT_REGISTRY: &str = "/usr/local/share/vulkan/registry/vk.xml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Path of the `vk.xml` registry.
	pub registry:         PathBuf,
	/// Value of the `api` attributes to keep.
	pub api:              String,
	/// File stem of the three generated files.
	pub output_name:      String,
	/// Go package name of the wrapper module.
	pub package_name:     String,
	pub features:         Vec<String>,
	pub extensions:       Vec<String>,
	/// Commands that are loaded by `vksDynamicLoad` and called without a facade.
	pub global_procs:     Vec<String>,
	/// Handle type to the C function that fills a proc address table for it.
	pub proc_loaders:     BTreeMap<String, String>,
	/// Lines emitted before the includes of the generated header.
	pub c_define_preproc: Vec<String>,
	/// Prefixes removed from exported Go names, in order.
	pub export_prefixes:  Vec<String>,
	pub doc_url:          String
}

fn strings(v: &[&str]) -> Vec<String> {
	v.iter().map(|s| s.to_string()).collect()
}

impl Default for Config {
	fn default() -> Self {
		Self {
			registry:         PathBuf::from(DEFAULT_REGISTRY),
			api:              "vulkan".to_string(),
			output_name:      "vk_wrapper".to_string(),
			package_name:     "vks".to_string(),
			features:         strings(&["VK_VERSION_1_0", "VK_VERSION_1_1", "VK_VERSION_1_2"]),
			extensions:       strings(&["VK_KHR_surface", "VK_KHR_swapchain", "VK_KHR_display", "VK_KHR_display_swapchain"]),
			global_procs:     strings(&[
				"vkGetInstanceProcAddr",
				"vkEnumerateInstanceVersion",
				"vkEnumerateInstanceExtensionProperties",
				"vkEnumerateInstanceLayerProperties",
				"vkCreateInstance"
			]),
			proc_loaders:     [
				("VkInstance", "vksLoadInstanceProcAddrs"),
				("VkDevice", "vksLoadDeviceProcAddrs")
			].iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
			c_define_preproc: strings(&["#define VK_ENABLE_BETA_EXTENSIONS", "#define VK_NO_PROTOTYPES"]),
			export_prefixes:  strings(&["Vk", "vk"]),
			doc_url:          "https://www.khronos.org/registry/vulkan/specs/1.2-extensions/man/html/".to_string()
		}
	}
}

impl Config {
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		log::debug!("loading config `{}`", path.display());
		Ok(serde_yaml::from_reader(BufReader::new(File::open(path)?))?)
	}

	pub fn from_yaml(yaml: &str) -> Result<Self> {
		Ok(serde_yaml::from_str(yaml)?)
	}

	/// Features followed by extensions, in configuration order.
	pub fn enabled(&self) -> Vec<&str> {
		self.features.iter()
			.chain(self.extensions.iter())
			.map(String::as_str)
			.collect()
	}

	pub fn is_global_proc(&self, name: &str) -> bool {
		self.global_procs.iter().any(|v| v == name)
	}

	pub fn proc_loader(&self, handle: &str) -> Option<&str> {
		self.proc_loaders.get(handle).map(String::as_str)
	}

	pub fn go_file(&self) -> String {
		format!("{}.go", self.output_name)
	}

	pub fn header_file(&self) -> String {
		format!("{}.h", self.output_name)
	}

	pub fn c_file(&self) -> String {
		format!("{}.c", self.output_name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_document_yields_defaults() {
		let config = Config::from_yaml("{}").unwrap();
		assert_eq!(config, Config::default());
		assert_eq!(config.enabled().first(), Some(&"VK_VERSION_1_0"));
		assert_eq!(config.enabled().last(), Some(&"VK_KHR_display_swapchain"));
		assert_eq!(config.proc_loader("VkDevice"), Some("vksLoadDeviceProcAddrs"));
		assert_eq!(config.header_file(), "vk_wrapper.h");
	}

	#[test]
	fn overrides_selected_fields() {
		let config = Config::from_yaml("
output_name: vulkan
features: [VK_VERSION_1_0]
extensions: []
global_procs: [vkCreateInstance]
").unwrap();
		assert_eq!(config.enabled(), vec!["VK_VERSION_1_0"]);
		assert!(config.is_global_proc("vkCreateInstance"));
		assert!(!config.is_global_proc("vkGetInstanceProcAddr"));
		assert_eq!(config.go_file(), "vulkan.go");
		assert_eq!(config.package_name, "vks");
	}

	#[test]
	fn rejects_unknown_keys() {
		assert!(Config::from_yaml("output: x").is_err());
	}
}
