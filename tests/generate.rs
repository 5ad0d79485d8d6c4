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

use vksgen::*;

const REGISTRY: &str = include_str!("data/mini_vk.xml");

fn config() -> Config {
	Config::from_yaml("
output_name: vk_mini
package_name: vkmini
features: [VK_VERSION_1_0, VK_VERSION_1_1]
extensions: [VK_KHR_surface, VK_KHR_swapchain]
").unwrap()
}

fn run(config: &Config) -> (String, String, String) {
	let registry = xml::deserialize::<Registry, _>(REGISTRY.as_bytes()).unwrap().for_api(&config.api);
	let (mut go, mut header, mut c) = (Vec::new(), Vec::new(), Vec::new());
	generate_to(&registry, config, &mut go, &mut header, &mut c).unwrap();
	(String::from_utf8(go).unwrap(), String::from_utf8(header).unwrap(), String::from_utf8(c).unwrap())
}

#[test]
fn outputs_refer_to_each_other() {
	let (go, header, c) = run(&config());
	assert!(go.starts_with("package vkmini\n"));
	assert!(go.contains("//#include \"vk_mini.h\"\n"));
	assert!(c.starts_with("#include <dlfcn.h>\n#include \"vk_mini.h\"\n"));
	assert!(header.starts_with("#ifndef __VKS_H__\n"));

	for name in ["vkCreateInstance", "vkDestroyInstance", "vkQueueWaitIdle", "vkDestroySwapchainKHR"] {
		assert!(header.contains(&format!("\tvoid* p{};\n", name)), "{} has no table entry", name);
		assert!(c.contains(&format!("((PFN_{0})addrs->p{0})(", name)), "{} is not forwarded", name);
		assert!(go.contains(&format!("C.{}(addrs", name)), "{} is not called from go", name);
	}
}

#[test]
fn enabled_names_select_the_output() {
	let (go, header, _) = run(&config());
	assert!(go.contains("type SwapchainKHR C.VkSwapchainKHR\n"));
	assert!(go.contains("VK_ERROR_SURFACE_LOST_KHR Result = -1000000000\n"));
	assert!(go.contains("VK_SUBOPTIMAL_KHR Result = 1000001003\n"));
	assert!(go.contains("VK_STRUCTURE_TYPE_DEVICE_GROUP_PRESENT_CAPABILITIES_KHR StructureType = 1000060007\n"));
	assert!(!go.contains("VK_STRUCTURE_TYPE_DEVICE_GROUP_SWAPCHAIN_CREATE_INFO_KHR"));
	assert!(!go.contains("PhysicalDeviceProperties2KHR"));

	let mut config = config();
	config.features = vec!["VK_VERSION_1_0".to_string()];
	config.extensions = Vec::new();
	let (go, header_1_0, _) = run(&config);
	assert!(!go.contains("SwapchainKHR"));
	assert!(!go.contains("VK_QUEUE_PROTECTED_BIT"));
	assert!(!header_1_0.contains("vkEnumerateInstanceVersion"));
	assert!(header.contains("vkEnumerateInstanceVersion"));
}

#[test]
fn nothing_enabled_yields_the_frame() {
	let config = Config { features: Vec::new(), extensions: Vec::new(), ..config() };
	let (go, header, c) = run(&config);
	assert!(go.contains("func Init() Result {"));
	assert!(go.contains("// These are API constants.\nconst ("));
	assert!(!go.contains("func CreateInstance("));
	assert!(header.contains("typedef struct vksProcAddr {\n} vksProcAddr;"));
	assert!(c.contains("void vksLoadInstanceProcAddrs(VkInstance hndl, vksProcAddr* addrs) {\n}"));
}

#[test]
fn reports_missing_registries() {
	let mut config = config();
	config.registry = "does/not/exist/vk.xml".into();
	let dir = std::env::temp_dir();
	assert!(matches!(generate(&config, &dir), Err(Error::Io(_))));
}
