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
	crate::{config::Config, translate::*},
	std::{collections::HashSet, io}
};

const HEADER_VERSION_COMPLETE: &str = "VK_HEADER_VERSION_COMPLETE";

/// Writes the Go wrapper module, `facades` are the C names of the handles that get a facade.
pub fn gen_go(
	writer:  &mut impl io::Write,
	items:   &[Item],
	facades: &HashSet<String>,
	config:  &Config
) -> io::Result<()> {
	let module = GoModule { config, facades };
	let (package, header) = (&config.package_name, config.header_file());

	write!(writer, r#"package {package}

//#cgo LDFLAGS: -lvulkan
//#include <stdlib.h>
//#include <string.h>
//#include "{header}"
import "C"
import (
	"bytes"
	"fmt"
	"unsafe"
)

// Init loads the Vulkan library and the global commands.
func Init() Result {{
	ret := C.vksDynamicLoad()
	ptr := (*Result)(&ret)
	return *ptr
}}

// Destroy unloads the Vulkan library.
func Destroy() {{
	C.vksDynamicUnload()
}}

// NewCString copies s to the C heap, the copy must be released with FreeCString.
func NewCString(s string) *byte {{
	b := nullTerminatedBuffer(s).Bytes()
	ptr := C.malloc(C.ulong(len(b)))
	C.memcpy(ptr, unsafe.Pointer(&b[0]), C.ulong(len(b)))
	return (*byte)(ptr)
}}

// FreeCString releases a string allocated by NewCString.
func FreeCString(ptr *byte) {{
	if ptr != nil {{
		C.free(unsafe.Pointer(ptr))
	}}
}}

"#)?;

	for item in items {
		module.item(writer, item)?;
		writeln!(writer)?;
	}

	writer.write_all(br#"
func newCBlock(sz C.ulong) unsafe.Pointer {
	ptr := C.malloc(sz)
	C.memset(ptr, 0, sz)
	return ptr
}

func nullTerminatedBuffer(s string) *bytes.Buffer {
	var str bytes.Buffer
	var isNullTerminated bool
	for _, c := range ([]byte)(s) {
		if c == 0 {
			isNullTerminated = true
		}
		str.WriteByte(c)
		if isNullTerminated {
			break
		}
	}
	if !isNullTerminated {
		str.WriteByte(0)
	}
	return &str
}
"#)
}

struct GoModule<'a> {
	config:  &'a Config,
	facades: &'a HashSet<String>
}

impl GoModule<'_> {
	fn doc(&self, name: &str) -> String {
		format!("{}{}.html", self.config.doc_url, name)
	}

	fn needs_facade(&self, name: &TranslatorRef) -> bool {
		self.facades.contains(&name.c())
	}

	/// The parameter a command is invoked on, if the command is a facade method.
	fn receiver<'b>(&self, command: &'b CommandData) -> Option<&'b CommandParamData> {
		match self.config.is_global_proc(&command.name.c()) {
			true => None,
			false => command.params.first().filter(|p| self.facades.contains(&p.type_name))
		}
	}

	fn item(&self, w: &mut impl io::Write, item: &Item) -> io::Result<()> {
		match item {
			Item::Const(list) => self.constants(w, list),
			Item::Version(data) => self.version(w, data),
			Item::HeaderVersion(data) => {
				let (name, value, doc) = (data.header_version.go(), &data.value, self.doc(&data.header_version.c()));
				writeln!(w, "// {name} is the version of the Vulkan headers this module was generated from.\n// {doc}\nconst {name} = {value}")
			}
			Item::Base { name, ty } => writeln!(w, "// {0} basetype\n// {1}\ntype {0} {2}", name.go(), self.doc(&name.c()), ty.go()),
			Item::Handle { name, parent } => self.handle(w, name, parent.as_ref()),
			Item::Enum(data) => self.enumeration(w, data),
			Item::Bitmask { name, ty } => writeln!(w, "// {0} bitmask\n// {1}\ntype {0} {2}", name.go(), self.doc(&name.c()), ty.go()),
			Item::Func { name, .. } => writeln!(w, "// {0} function pointer\n// {1}\ntype {0} {2}", name.go(), self.doc(&name.c()), name.cgo()),
			Item::Struct(data) => self.structure(w, data),
			Item::Alias { name, alias } => {
				let (name, alias, doc) = (name.go(), alias.go(), self.doc(&name.c()));
				writeln!(w, r#"// {name} is an alias to {alias}.
// {doc}
//
// Deprecated: most aliases exist because an extension was promoted to a feature,
// use {alias} instead.
type {name} = {alias}"#)
			}
			Item::Union { name } => writeln!(w, "// {0} union\n// {1}\ntype {0} {2}", name.go(), self.doc(&name.c()), name.cgo()),
			Item::Command(data) => self.command(w, data)
		}
	}

	fn constants(&self, w: &mut impl io::Write, list: &[ConstData]) -> io::Result<()> {
		write!(w, "// These are API constants.\nconst (")?;
		for v in list {
			write!(w, "\n\t{} = {}", v.name.go(), v.value.go())?;
		}
		writeln!(w, "\n)")
	}

	fn version(&self, w: &mut impl io::Write, data: &DefineData) -> io::Result<()> {
		let (name, doc) = (data.name.go(), self.doc("VK_MAKE_API_VERSION"));

		write!(w, r#"// {name} is a packed Vulkan API version, see
// {doc}
type {name} uint32

// Make{name} packs a variant, major, minor and patch version.
func Make{name}(v, j, n, p int) {name} {{
	return {name}((uint32(v) << 29) | (uint32(j) << 22) | (uint32(n) << 12) | (uint32(p)))
}}

func (v {name}) Major() uint32   {{ return uint32((v >> 22) & 0x7F) }}
func (v {name}) Minor() uint32   {{ return uint32((v >> 12) & 0x3FF) }}
func (v {name}) Patch() uint32   {{ return uint32(v & 0xFFF) }}
func (v {name}) Variant() uint32 {{ return uint32(v >> 29) }}
func (v {name}) String() string {{
	return fmt.Sprintf("%d[v.%d.%d.%d.%d]", v, v.Variant(), v.Major(), v.Minor(), v.Patch())
}}

var ("#)?;

		let width = HEADER_VERSION_COMPLETE.len();
		for (version, args) in &data.api_versions {
			write!(w, "\n\t{version:<width$} {name} = Make{name}({args})")?;
		}

		writeln!(w, "\n\t{HEADER_VERSION_COMPLETE} {name} = Make{name}({}, {})\n)", data.value, data.header_version.go())
	}

	fn handle(&self, w: &mut impl io::Write, name: &TranslatorRef, parent: Option<&TranslatorRef>) -> io::Result<()> {
		let (go, cgo, facade, doc) = (name.go(), name.cgo(), name.go_facade(), self.doc(&name.c()));
		let needs_facade = self.needs_facade(name);

		write!(w, "// {go} is a Handle to a vulkan resource.")?;
		if let Some(parent) = parent {
			write!(w, "\n// {go} is a child of {}.", parent.go())?;
		}

		if needs_facade {
			let via = parent.map_or_else(String::new, |v| format!("{}.", v.go_facade()));
			write!(w, "\n//\n// Use {via}Make{facade} to create a facade around this object to invoke methods.")?;
		}

		write!(w, r#"
//
// {doc}
type {go} {cgo}

// Null{go} is a typed Null value for the {go} type.
var Null{go} {go}
"#)?;

		if !needs_facade {
			return Ok(());
		}

		match (self.config.proc_loader(&name.c()), parent) {
			(Some(loader), None) => write!(w, r#"
// Make{facade} loads the proc addresses of x into a new facade.
func Make{facade}(x {go}) {facade} {{
	var addrs C.vksProcAddr
	C.{loader}({cgo}(x), &addrs)
	return {facade}{{
		H:     x,
		procs: &addrs,
	}}
}}
"#)?,
			(Some(loader), Some(parent)) => {
				let parent = parent.go_facade();
				write!(w, r#"
// Make{facade} loads the proc addresses of x through the addresses of the parent facade.
func (parent {parent}) Make{facade}(x {go}) {facade} {{
	var addrs C.vksProcAddr
	C.{loader}({cgo}(x), &addrs, parent.procs)
	return {facade}{{
		H:     x,
		procs: &addrs,
	}}
}}
"#)?
			}
			(None, Some(parent)) => {
				let parent = parent.go_facade();
				write!(w, r#"
// Make{facade} creates a facade sharing the proc addresses of the parent facade.
func (parent {parent}) Make{facade}(x {go}) {facade} {{
	return {facade}{{
		H:     x,
		procs: parent.procs,
	}}
}}
"#)?
			}
			(None, None) => log::warn!("`{}` has neither a parent nor a proc loader, its facade cannot be created", name.c())
		}

		write!(w, r#"
// {facade} is a {go} handle with the proc addresses of its commands, which
// are its methods.
//
// Use the H field to get the handle back.
type {facade} struct {{
	H     {go} // The vulkan Handle
	procs *C.vksProcAddr // The addresses for commands.
}}
"#)
	}

	fn enumeration(&self, w: &mut impl io::Write, data: &EnumData) -> io::Result<()> {
		let (name, ty, doc) = (data.name.go(), data.ty.go(), self.doc(&data.name.c()));
		write!(w, "// {name} enum/enums\n// {doc}\ntype {name} {ty}")?;

		if !data.values.is_empty() {
			write!(w, "\n\nconst (")?;
			for v in &data.values {
				write!(w, "\n\t{} {name} = {}", v.name.go(), v.value.go())?;
			}

			write!(w, "\n)\n\nvar (\n\treverse{name} map[{name}]string = map[{name}]string{{")?;
			for v in data.values.iter().filter(|v| !v.alias) {
				write!(w, "\n\t\t{0}: \"{0}\",", v.name.go())?;
			}

			write!(w, r#"
	}}
)

func (x {name}) String() string {{
	if s, ok := reverse{name}[x]; ok {{
		return s
	}}
	return fmt.Sprintf("{name}=%d", x)
}}"#)?;
		}

		writeln!(w)
	}

	fn structure(&self, w: &mut impl io::Write, data: &StructData) -> io::Result<()> {
		let (name, c, cgo, doc) = (data.name.go(), data.name.c(), data.name.cgo(), self.doc(&data.name.c()));

		write!(w, r#"// {name} provides a go interface for {c}.
// {doc}
type {name} {cgo}

// Sizeof{name} is the memory size of a {name}
var Sizeof{name} int = int(unsafe.Sizeof({name}{{}}))

// Free releases the memory allocated by AsCPtr, but not the memory its members point to.
func (x *{name}) Free() {{
	C.free(unsafe.Pointer(x))
}}

// AsCPtr copies x to the C heap, the copy must be released with Free.
func (x {name}) AsCPtr() *{name} {{
	clone := (*{name})(newCBlock(C.ulong(Sizeof{name})))
	*clone = x
	return clone
}}

// {name}FreeCSlice releases the memory allocated by {name}MakeCSlice.
func {name}FreeCSlice(x []{name}) {{
	if len(x) > 0 {{
		C.free(unsafe.Pointer(&x[0]))
	}}
}}

// {name}MakeCSlice copies x to the C heap and returns a slice of the copy, which
// must be released with {name}FreeCSlice.
func {name}MakeCSlice(x ...{name}) []{name} {{
	if len(x) == 0 {{
		return nil
	}}
	sz := Sizeof{name} * len(x)
	dst := unsafe.Slice((*{name})(newCBlock(C.ulong(sz))), len(x))
	copy(dst, x)
	return dst
}}"#)?;

		for m in &data.members {
			let (member, field, ty) = (m.name.go(), m.name.cgo(), m.ty.go());
			let (c_member, c_to_go) = (m.name.c(), m.ty.c_to_go());

			write!(w, r#"

// {member} returns the value of {c_member} from {c}
func (x {name}) {member}() {ty} {{
	ptr := {c_to_go}(&x.{field})
	return *ptr
}}"#)?;

			if let Some(value) = &m.value {
				write!(w, r#"

// WithDefault{member} sets {member} to the only value the registry allows.
func (x {name}) WithDefault{member}() {name} {{
	return x.With{member}({})
}}"#, value.go())?;
			}

			if data.read_only && member != "PNext" && member != "SType" {
				continue;
			}

			let go_to_c = m.ty.go_to_c();
			let length = m.length.and_then(|i| data.members.get(i));

			write!(w, "\n\n// With{member} sets {member} on the underlying C structure.")?;
			if let Some(length) = length {
				write!(w, "\n//\n// {} is the length of this field and is set to the length of y.", length.name.go())?;
			}

			write!(w, "\nfunc (x {name}) With{member}(y {ty}) {name} {{")?;
			match m.copy {
				true => write!(w, "\n\tptr := {go_to_c}(&y)\n\tcopy(x.{field}[:], unsafe.Slice(*ptr, len(y)))")?,
				false => write!(w, "\n\tx.{field} = *({go_to_c}(&y))")?
			}

			match length {
				Some(length) => write!(w, "\n\treturn x.With{}({}(len(y)))\n}}", length.name.go(), length.ty.go())?,
				None => write!(w, "\n\treturn x\n}}")?
			}
		}

		writeln!(w)
	}

	fn command(&self, w: &mut impl io::Write, data: &CommandData) -> io::Result<()> {
		let (name, doc) = (data.name.go(), self.doc(&data.name.c()));
		let receiver = self.receiver(data);
		let void = data.ret.c() == "void";

		write!(w, "// {name} command\n// {doc}\nfunc ")?;
		if let Some(receiver) = receiver {
			write!(w, "(x {}) ", receiver.ty.go_facade())?;
		}

		let params = data.params.iter()
			.skip(usize::from(receiver.is_some()))
			.map(|p| format!("{} {}", p.name.go(), p.ty.go()))
			.collect::<Vec<_>>()
			.join(", ");

		write!(w, "{name}({params}) ")?;
		if !void {
			write!(w, "{} ", data.ret.go())?;
		}

		write!(w, "{{\n\taddrs := {}", if receiver.is_some() { "x.procs" } else { "&C.vksProcAddresses" })?;
		for (i, p) in data.params.iter().enumerate() {
			let arg = match (i, receiver) {
				(0, Some(_)) => "x.H".to_string(),
				_ => p.name.go()
			};
			write!(w, "\n\tp{} := {}(&{})", i, p.ty.go_to_c(), arg)?;
		}

		let args = (0..data.params.len()).map(|i| format!(", *p{}", i)).collect::<String>();
		match void {
			true => writeln!(w, "\n\t{}(addrs{})\n}}", data.name.cgo(), args),
			false => writeln!(w, "\n\tret := {}(addrs{})\n\tretPtr := {}(&ret)\n\treturn *retPtr\n}}",
				data.name.cgo(), args, data.ret.c_to_go())
		}
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::gen::{determine_facades, tests::fixture}};

	fn generate() -> String {
		let (graph, config, items) = fixture();
		let facades = determine_facades(&graph, &config, &items);
		let mut buf = Vec::new();
		gen_go(&mut buf, &items, &facades, &config).unwrap();
		String::from_utf8(buf).unwrap()
	}

	#[test]
	fn writes_the_module_frame() {
		let go = generate();
		assert!(go.starts_with("package vks\n"));
		assert!(go.contains("//#include \"vk_wrapper.h\"\nimport \"C\""));
		assert!(go.contains("func Init() Result {"));
		assert!(go.trim_end().ends_with("return &str\n}"));
		assert!(go.find("// These are API constants.") < go.find("type ApiVersion uint32"));
	}

	#[test]
	fn writes_constants_and_versions() {
		let go = generate();
		assert!(go.contains("\n\tVK_WHOLE_SIZE = ^uint64(0)\n"));
		assert!(go.contains("\n\tVK_LUID_SIZE_KHR = VK_LUID_SIZE\n"));
		assert!(go.contains("const HeaderVersion = 250\n"));
		assert!(go.contains("\n\tVK_API_VERSION_1_1         ApiVersion = MakeApiVersion(0, 1, 1, 0)\n"));
		assert!(go.contains("\n\tVK_HEADER_VERSION_COMPLETE ApiVersion = MakeApiVersion(0, 1, 3, HeaderVersion)\n)"));
	}

	#[test]
	fn writes_handles_and_facades() {
		let go = generate();
		assert!(go.contains("type Instance C.VkInstance\n"));
		assert!(go.contains("func MakeInstanceFacade(x Instance) InstanceFacade {"));
		assert!(go.contains("\tC.vksLoadInstanceProcAddrs(C.VkInstance(x), &addrs)\n"));
		assert!(go.contains("func (parent PhysicalDeviceFacade) MakeDeviceFacade(x Device) DeviceFacade {"));
		assert!(go.contains("\tC.vksLoadDeviceProcAddrs(C.VkDevice(x), &addrs, parent.procs)\n"));
		assert!(go.contains("func (parent DeviceFacade) MakeQueueFacade(x Queue) QueueFacade {\n\treturn QueueFacade{\n\t\tH:     x,\n\t\tprocs: parent.procs,"));
		assert!(go.contains("// SwapchainKHR is a child of SurfaceKHR.\n"));
		assert!(!go.contains("SurfaceKHRFacade"));
	}

	#[test]
	fn writes_enums() {
		let go = generate();
		assert!(go.contains("type Result int32\n\nconst (\n\tVK_SUCCESS Result = 0\n"));
		assert!(go.contains("\n\tVK_ERROR_OUT_OF_POOL_MEMORY Result = -1000069000\n"));
		assert!(go.contains("\n\t\tVK_NOT_READY: \"VK_NOT_READY\",\n"));
		assert!(go.contains("return fmt.Sprintf(\"Result=%d\", x)"));
		assert!(go.contains("\n\tVK_QUEUE_PROTECTED_BIT QueueFlagBits = (1 << 4)\n"));
		assert!(go.contains("type QueueFlags Flags\n"));
	}

	#[test]
	fn writes_structs() {
		let go = generate();
		assert!(go.contains("type DeviceQueueCreateInfo C.struct_VkDeviceQueueCreateInfo\n"));
		assert!(go.contains("func (x DeviceQueueCreateInfo) WithDefaultSType() DeviceQueueCreateInfo {\n\treturn x.WithSType(VK_STRUCTURE_TYPE_DEVICE_QUEUE_CREATE_INFO)\n}"));
		assert!(go.contains("func (x DeviceQueueCreateInfo) WithPQueuePriorities(y []float32) DeviceQueueCreateInfo {"));
		assert!(go.contains("\treturn x.WithQueueCount(uint32(len(y)))\n}"));
		assert!(go.contains("func (x PhysicalDeviceProperties) DeviceName() []byte {"));
		assert!(!go.contains("func (x PhysicalDeviceProperties) WithDeviceName("));
		assert!(go.contains("func (x PhysicalDeviceProperties2) WithPNext(y unsafe.Pointer) PhysicalDeviceProperties2 {"));
		assert!(go.contains("type ClearColorValue C.VkClearColorValue\n"));
	}

	#[test]
	fn writes_commands() {
		let go = generate();
		assert!(go.contains(
			"func CreateInstance(pCreateInfo *InstanceCreateInfo, pInstance *Instance) Result {\n\taddrs := &C.vksProcAddresses\n"
		));
		assert!(go.contains("\tret := C.vkCreateInstance(addrs, *p0, *p1)\n\tretPtr := /* typedef */ (*Result)(&ret)\n\treturn *retPtr\n}"));
		assert!(go.contains("func (x InstanceFacade) DestroyInstance() {\n\taddrs := x.procs\n\tp0 := /* typedef */ (*C.VkInstance)(&x.H)\n\tC.vkDestroyInstance(addrs, *p0)\n}"));
		assert!(go.contains("func (x DeviceFacade) GetDeviceQueue(queueFamilyIndex uint32, queueIndex uint32, pQueue *Queue) {"));
	}
}
