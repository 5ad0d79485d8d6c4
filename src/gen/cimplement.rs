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
	super::{commands, c_signature},
	crate::{config::Config, translate::Item},
	std::io
};

const GET_INSTANCE_PROC_ADDR: &str = "vkGetInstanceProcAddr";
const GET_DEVICE_PROC_ADDR: &str = "vkGetDeviceProcAddr";

/// Writes the C implementation, which loads the library with `dlopen` and forwards
/// every wrapper to the address in its table.
pub fn gen_c_impl(writer: &mut impl io::Write, items: &[Item], config: &Config) -> io::Result<()> {
	let names = commands(items).map(|v| v.name.c()).collect::<Vec<_>>();
	for required in [GET_INSTANCE_PROC_ADDR, GET_DEVICE_PROC_ADDR] {
		if !names.iter().any(|v| v == required) {
			log::warn!("`{}` is not emitted, the generated loaders will not compile", required);
		}
	}

	write!(writer, r#"#include <dlfcn.h>
#include "{}"

vksProcAddr vksProcAddresses;
void *vulkanHandle = NULL;

#if defined(_WIN64) || defined(_WIN32)
	#define LIB_NAME "vulkan.dll"
#elif defined(__linux__) || defined(__FreeBSD__) || defined (__NetBSD__) || defined(__OpenBSD__) || defined(__DragonFly__)
	#define LIB_NAME "libvulkan.so"
#elif defined(__APPLE__) || defined(__MACH__)
	#define LIB_NAME "libvulkan.dylib"
#endif

VkResult vksDynamicLoad() {{
	vulkanHandle = dlopen(LIB_NAME, RTLD_NOW | RTLD_LOCAL);
	if (vulkanHandle == NULL) {{
		return VK_ERROR_UNKNOWN;
	}}
	vksProcAddresses.p{GET_INSTANCE_PROC_ADDR} = dlsym(vulkanHandle, "{GET_INSTANCE_PROC_ADDR}");
"#, config.header_file())?;

	for proc in config.global_procs.iter().filter(|v| *v != GET_INSTANCE_PROC_ADDR) {
		match names.contains(proc) {
			true => writeln!(writer,
				"\tvksProcAddresses.p{0} = {GET_INSTANCE_PROC_ADDR}(&vksProcAddresses, NULL, \"{0}\");", proc)?,
			false => log::debug!("global proc `{}` is not emitted", proc)
		}
	}

	writer.write_all(br#"	return VK_SUCCESS;
}

void vksDynamicUnload() {
	dlclose(vulkanHandle);
}

void vksLoadInstanceProcAddrs(VkInstance hndl, vksProcAddr* addrs) {"#)?;

	for name in &names {
		write!(writer, "\n\taddrs->p{0} = {GET_INSTANCE_PROC_ADDR}(&vksProcAddresses, hndl, \"{0}\");", name)?;
	}

	writer.write_all(b"\n}\n\nvoid vksLoadDeviceProcAddrs(VkDevice hndl, vksProcAddr* addrs, vksProcAddr* parent) {")?;
	for name in &names {
		write!(writer, "\n\taddrs->p{0} = {GET_DEVICE_PROC_ADDR}(parent, hndl, \"{0}\");", name)?;
	}

	writer.write_all(b"\n}\n")?;

	for command in commands(items) {
		let name = command.name.c();
		let args = command.params.iter().map(|p| p.name.c()).collect::<Vec<_>>().join(", ");

		write!(writer, "\n{} {{\n\t", c_signature(command))?;
		match command.ret.c().as_str() {
			"void" => writeln!(writer, "((PFN_{name})addrs->p{name})({args});\n}}")?,
			ret => writeln!(writer, "{ret} ret = ((PFN_{name})addrs->p{name})({args});\n\treturn ret;\n}}")?
		}
	}

	Ok(())
}
