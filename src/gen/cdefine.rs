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

/// Writes the C header declaring the proc address table and a wrapper per command.
pub fn gen_c_header(writer: &mut impl io::Write, items: &[Item], config: &Config) -> io::Result<()> {
	writer.write_all(b"#ifndef __VKS_H__\n#define __VKS_H__\n")?;
	for line in &config.c_define_preproc {
		writeln!(writer, "{}", line)?;
	}

	writer.write_all(b"#include <stdlib.h>\n#include <string.h>\n#include \"vulkan/vulkan.h\"\n\ntypedef struct vksProcAddr {")?;
	for command in commands(items) {
		write!(writer, "\n\tvoid* p{};", command.name.c())?;
	}

	writer.write_all(br#"
} vksProcAddr;

extern vksProcAddr vksProcAddresses;

void vksLoadInstanceProcAddrs(VkInstance, vksProcAddr*);
void vksLoadDeviceProcAddrs(VkDevice, vksProcAddr*, vksProcAddr*);
VkResult vksDynamicLoad();
void vksDynamicUnload();

"#)?;

	for command in commands(items) {
		writeln!(writer, "{};", c_signature(command))?;
	}

	writer.write_all(b"\n#endif\n")
}
