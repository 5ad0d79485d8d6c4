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

//! C, cgo and Go spellings of registry names and types, and the items built from them.

use {
	crate::{config::Config, graph::*, parse::*},
	once_cell::sync::Lazy,
	regex::Regex,
	std::{collections::HashMap, fmt, rc::Rc}
};

static NUMERIC_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());
static CONST_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[[^\]]+\]").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static TRAILING_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)$").unwrap());
static HEADER_VERSION_COMPLETE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\((\d+, \d+, \d+), VK_HEADER_VERSION\)$").unwrap());
static API_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^VK_API_VERSION_\d+_\d+$").unwrap());
static FEATURE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"^VK_VERSION_(\d+)_(\d+)$").unwrap());

/// Defines that are either meaningless in Go or part of the version template.
const SKIPPED_DEFINES: &[&str] = &[
	"VK_MAKE_VERSION",
	"VK_VERSION_MAJOR",
	"VK_VERSION_MINOR",
	"VK_VERSION_PATCH",
	"VK_API_VERSION",
	"VK_DEFINE_HANDLE",
	"VK_USE_64_BIT_PTR_DEFINES",
	"VK_NULL_HANDLE",
	"VK_DEFINE_NON_DISPATCHABLE_HANDLE",
	"VK_API_VERSION_VARIANT",
	"VK_API_VERSION_MAJOR",
	"VK_API_VERSION_MINOR",
	"VK_API_VERSION_PATCH",
	"VK_MAKE_API_VERSION"
];

pub type TranslatorRef = Rc<dyn Translator>;

/// A name or type in each of the three output languages.
pub trait Translator: fmt::Debug {
	fn c(&self) -> String;

	fn cgo(&self) -> String;

	fn go(&self) -> String;

	fn go_facade(&self) -> String {
		format!("{}Facade", self.go())
	}

	/// A Go function converting a `*CGO` into a `*GO`, a plain cast unless overridden.
	fn c_to_go(&self) -> String {
		format!("/* typedef */ (*{})", self.go())
	}

	/// A Go function converting a `*GO` into a `*CGO`, a plain cast unless overridden.
	fn go_to_c(&self) -> String {
		format!("/* typedef */ (*{})", self.cgo())
	}

	/// The declaration of a C parameter of this type.
	fn c_param(&self, name: &str) -> String {
		format!("{} {}", self.c(), name)
	}
}

fn upper_first(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(c) => c.to_uppercase().chain(chars).collect(),
		None => String::new()
	}
}

/// Values that are spelled the same everywhere, e.g. `198` or `VK_SUCCESS`.
#[derive(Debug, Clone)]
pub struct Literal(pub String);

impl Translator for Literal {
	fn c(&self) -> String { self.0.clone() }
	fn cgo(&self) -> String { self.0.clone() }
	fn go(&self) -> String { self.0.clone() }
}

#[derive(Debug, Clone, Copy)]
pub struct BitValue(pub u32);

impl Translator for BitValue {
	fn c(&self) -> String { self.go() }
	fn cgo(&self) -> String { self.go() }
	fn go(&self) -> String { format!("(1 << {})", self.0) }
}

/// Renames identifiers that are Go keywords.
#[derive(Debug, Clone)]
pub struct ReservedWord(pub TranslatorRef);

impl Translator for ReservedWord {
	fn c(&self) -> String {
		self.0.c()
	}

	fn cgo(&self) -> String {
		match self.0.cgo().as_str() {
			v @ ("type" | "range" | "func") => format!("_{}", v),
			v => v.to_string()
		}
	}

	fn go(&self) -> String {
		match self.0.go().as_str() {
			v @ ("type" | "range" | "func") => format!("{}_", v),
			v => v.to_string()
		}
	}
}

/// `VK_API_VERSION` becomes `vkApiVersion`.
#[derive(Debug, Clone)]
pub struct CamelCase(pub String);

impl Translator for CamelCase {
	fn c(&self) -> String {
		self.0.clone()
	}

	fn cgo(&self) -> String {
		self.0.clone()
	}

	fn go(&self) -> String {
		if !self.0.contains('_') {
			return self.0.clone();
		}

		self.0.to_lowercase()
			.split('_')
			.enumerate()
			.map(|(i, v)| if i == 0 { v.to_string() } else { upper_first(v) })
			.collect()
	}
}

#[derive(Debug, Clone)]
pub struct TypeDef(pub String);

impl Translator for TypeDef {
	fn c(&self) -> String { self.0.clone() }
	fn cgo(&self) -> String { format!("C.{}", self.0) }
	fn go(&self) -> String { self.0.clone() }
}

#[derive(Debug, Clone)]
pub struct StructName(pub String);

impl Translator for StructName {
	fn c(&self) -> String { self.0.clone() }
	fn cgo(&self) -> String { format!("C.struct_{}", self.0) }
	fn go(&self) -> String { self.0.clone() }
}

/// Removes the configured prefixes from the Go name and makes it public.
#[derive(Debug, Clone)]
pub struct Export {
	orig:     TranslatorRef,
	prefixes: Rc<[String]>
}

impl Export {
	pub fn new(orig: TranslatorRef, prefixes: Rc<[String]>) -> Self {
		Self { orig, prefixes }
	}
}

impl Translator for Export {
	fn c(&self) -> String {
		self.orig.c()
	}

	fn cgo(&self) -> String {
		self.orig.cgo()
	}

	fn go(&self) -> String {
		let mut name = self.orig.go();
		for prefix in self.prefixes.iter() {
			if let Some(v) = name.strip_prefix(prefix.as_str()) {
				name = v.to_string();
			}
		}
		upper_first(&name)
	}
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Scalar {
	pub ty:   &'static str,
	pub cgo:  &'static str,
	pub go:   &'static str
}

pub const INT32: Scalar = Scalar { ty: "int32_t", cgo: "C.int", go: "int32" };
pub const INT64: Scalar = Scalar { ty: "int64_t", cgo: "C.longlong", go: "int64" };
pub const UINT32: Scalar = Scalar { ty: "uint32_t", cgo: "C.uint", go: "uint32" };
pub const UINT64: Scalar = Scalar { ty: "uint64_t", cgo: "C.ulonglong", go: "uint64" };
pub const VOID_PTR: Scalar = Scalar { ty: "void*", cgo: "unsafe.Pointer", go: "unsafe.Pointer" };

pub const SCALARS: &[Scalar] = &[
	Scalar { ty: "int8_t", cgo: "C.schar", go: "int8" },
	Scalar { ty: "int16_t", cgo: "C.short", go: "int16" },
	INT32,
	INT64,
	Scalar { ty: "uint8_t", cgo: "C.uchar", go: "byte" },
	Scalar { ty: "uint16_t", cgo: "C.ushort", go: "uint16" },
	UINT32,
	UINT64,
	Scalar { ty: "size_t", cgo: "C.ulong", go: "uint64" },
	Scalar { ty: "float", cgo: "C.float", go: "float32" },
	Scalar { ty: "double", cgo: "C.double", go: "float64" },
	Scalar { ty: "char", cgo: "C.char", go: "byte" },
	VOID_PTR
];

impl Scalar {
	pub fn get(ty: &str) -> Option<Self> {
		SCALARS.iter().find(|v| v.ty == ty).copied()
	}
}

impl Translator for Scalar {
	fn c(&self) -> String {
		self.ty.to_string()
	}

	fn cgo(&self) -> String {
		self.cgo.to_string()
	}

	fn go(&self) -> String {
		self.go.to_string()
	}

	fn c_to_go(&self) -> String {
		format!("func(x *{0}) *{1} {{ /* Scalar */ return (*{1})(unsafe.Pointer(x)) }}", self.cgo, self.go)
	}

	fn go_to_c(&self) -> String {
		format!("func(x *{0}) *{1} {{ /* Scalar */ return (*{1})(unsafe.Pointer(x)) }}", self.go, self.cgo)
	}
}

#[derive(Debug, Clone)]
pub struct Pointer(pub TranslatorRef);

impl Translator for Pointer {
	fn c(&self) -> String {
		format!("{}*", self.0.c())
	}

	fn cgo(&self) -> String {
		format!("*{}", self.0.cgo())
	}

	fn go(&self) -> String {
		format!("*{}", self.0.go())
	}

	fn c_to_go(&self) -> String {
		format!("func(x *{0}) *{1} {{ /* Pointer */ return (*{1})(unsafe.Pointer(x)) }}", self.cgo(), self.go())
	}

	fn go_to_c(&self) -> String {
		format!("func(x *{0}) *{1} {{ /* Pointer */ return (*{1})(unsafe.Pointer(x)) }}", self.go(), self.cgo())
	}
}

/// A pointer to a number of elements given by another member or parameter.
#[derive(Debug, Clone)]
pub struct Slice(pub TranslatorRef);

impl Translator for Slice {
	fn c(&self) -> String {
		format!("{}*", self.0.c())
	}

	fn cgo(&self) -> String {
		format!("*{}", self.0.cgo())
	}

	fn go(&self) -> String {
		format!("[]{}", self.0.go())
	}

	fn c_to_go(&self) -> String {
		format!(
			"func(x *{0}) *{1} {{ /* Slice */ slc := unsafe.Slice((*{2})(unsafe.Pointer(*x)), (1 << 31)); return &slc }}",
			self.cgo(), self.go(), self.0.go())
	}

	fn go_to_c(&self) -> String {
		format!(
			"func(x *{0}) *{1} {{ /* Slice */ if len(*x) > 0 {{ slc := ({1})(unsafe.Pointer(&((*x)[0]))); return &slc }}; var ptr unsafe.Pointer; return (*{1})(unsafe.Pointer((&ptr))) }}",
			self.go(), self.cgo())
	}
}

#[derive(Debug, Clone)]
pub struct Array {
	pub orig: TranslatorRef,
	pub size: String
}

impl Translator for Array {
	fn c(&self) -> String {
		format!("{}[{}]", self.orig.c(), self.size)
	}

	fn cgo(&self) -> String {
		format!("[{}]{}", self.size, self.orig.cgo())
	}

	fn go(&self) -> String {
		format!("[]{}", self.orig.go())
	}

	fn c_to_go(&self) -> String {
		format!(
			"func(x *{0}) *{1} {{ /* Array */ slc := unsafe.Slice((*{2})(unsafe.Pointer(x)), {3}); return &slc }}",
			self.cgo(), self.go(), self.orig.go(), self.size)
	}

	fn go_to_c(&self) -> String {
		format!(
			"func(x *{0}) **{1} {{ /* Array */ if len(*x) > 0 {{ slc := (*{1})(unsafe.Pointer(&((*x)[0]))); return &slc }}; var ptr unsafe.Pointer; return (**{1})(unsafe.Pointer((&ptr))) }}",
			self.go(), self.orig.cgo())
	}

	fn c_param(&self, name: &str) -> String {
		format!("{} {}[{}]", self.orig.c(), name, self.size)
	}
}

/// Translators by registry name, seeded with the scalar types.
#[derive(Debug, Clone)]
pub struct TranslatorCache {
	map:      HashMap<String, TranslatorRef>,
	prefixes: Rc<[String]>
}

impl TranslatorCache {
	pub fn new(prefixes: &[String]) -> Self {
		Self {
			map:      SCALARS.iter().map(|v| (v.ty.to_string(), Rc::new(*v) as TranslatorRef)).collect(),
			prefixes: Rc::from(prefixes.to_vec())
		}
	}

	pub fn prefixes(&self) -> Rc<[String]> {
		self.prefixes.clone()
	}

	pub fn cached(&self, name: &str) -> Option<TranslatorRef> {
		self.map.get(name).cloned()
	}

	pub fn scalar(&self, name: &str) -> Option<TranslatorRef> {
		Scalar::get(name).map(|v| Rc::new(v) as TranslatorRef)
	}

	pub fn export(&self, orig: impl Translator + 'static) -> TranslatorRef {
		Rc::new(Export::new(Rc::new(orig), self.prefixes.clone()))
	}

	fn get_or_insert(&mut self, name: &str, make: impl FnOnce(&Self) -> TranslatorRef) -> TranslatorRef {
		if let Some(v) = self.map.get(name) {
			return v.clone();
		}

		let v = make(self);
		self.map.insert(name.to_string(), v.clone());
		v
	}

	/// Commands, base types, handles, enums and their values, function pointers and unions.
	pub fn named(&mut self, name: &str) -> TranslatorRef {
		self.get_or_insert(name, |cache| cache.export(TypeDef(name.to_string())))
	}

	pub fn define(&mut self, name: &str) -> TranslatorRef {
		self.get_or_insert(name, |cache| cache.export(CamelCase(name.to_string())))
	}

	pub fn structure(&mut self, name: &str) -> TranslatorRef {
		self.get_or_insert(name, |cache| cache.export(StructName(name.to_string())))
	}

	/// The translator of a type or command as it is declared.
	pub fn declared(&mut self, node: &RegistryNode) -> Option<TranslatorRef> {
		match &node.element {
			Element::Type(ty) => match ty.category {
				TypeCategory::Define => Some(self.define(&ty.name)),
				TypeCategory::Struct => Some(self.structure(&ty.name)),
				TypeCategory::Basetype
				| TypeCategory::Handle
				| TypeCategory::Enum
				| TypeCategory::Bitmask
				| TypeCategory::FuncPointer
				| TypeCategory::Union => Some(self.named(&ty.name)),
				_ => None
			},
			Element::Command(command) => Some(self.named(command.name())),
			_ => None
		}
	}

	/// The type of a struct member or command parameter, `raw` is the declaration
	/// text around the type and name without the member comment, `len` the registry's
	/// length attribute.
	pub fn member_type(&self, ty_name: &str, len: Option<&str>, raw: &str) -> TranslatorRef {
		let mut ty_name = if ty_name.is_empty() { "uint32_t" } else { ty_name };

		let mut pointers = raw.matches('*').count() as i32;
		if pointers > 0 && ty_name == "void" {
			ty_name = "void*";
		}

		let mut slices = len.map_or(0, |len| len.split(',')
			.map(str::trim)
			.filter(|v| *v != "null-terminated" && *v != "1")
			.count()) as i32;
		if raw.contains('[') {
			slices += 1;
		}

		pointers -= slices;
		if ty_name == "void*" {
			if pointers > 0 {
				pointers -= 1;
			} else {
				slices -= 1;
			}
		}

		let size = match slices > 0 {
			true => NUMERIC_SIZE.find(&raw)
				.or_else(|| CONST_SIZE.find(&raw))
				.map(|m| {
					let m = m.as_str();
					TAG.replace_all(&m[1..m.len() - 1], "").into_owned()
				}),
			false => None
		};

		if size.is_some() {
			slices -= 1;
		}

		let mut ty = self.cached(ty_name).unwrap_or_else(|| Rc::new(TypeDef(ty_name.to_string())));
		for _ in 0..pointers {
			ty = Rc::new(Pointer(ty));
		}

		for _ in 0..slices {
			ty = Rc::new(Slice(ty));
		}

		if let Some(size) = size {
			ty = Rc::new(Array { orig: ty, size });
		}

		ty
	}
}

#[derive(Debug, Clone)]
pub struct ConstData {
	pub name:  TranslatorRef,
	pub value: TranslatorRef
}

#[derive(Debug, Clone)]
pub struct DefineData {
	/// The version type, `ApiVersion`.
	pub name:           TranslatorRef,
	pub header_version: TranslatorRef,
	pub value:          String,
	/// `VK_API_VERSION_<x>_<y>` and its `MakeApiVersion` arguments, per enabled core version.
	pub api_versions:   Vec<(String, String)>
}

#[derive(Debug, Clone)]
pub struct EnumData {
	pub name:   TranslatorRef,
	pub ty:     TranslatorRef,
	pub values: Vec<EnumValueData>
}

#[derive(Debug, Clone)]
pub struct EnumValueData {
	pub name:  TranslatorRef,
	pub value: TranslatorRef,
	/// Aliases are left out of the reverse lookup.
	pub alias: bool
}

#[derive(Debug, Clone)]
pub struct StructData {
	pub name:      TranslatorRef,
	pub members:   Vec<StructMemberData>,
	pub read_only: bool
}

#[derive(Debug, Clone)]
pub struct StructMemberData {
	pub name:   TranslatorRef,
	pub ty:     TranslatorRef,
	/// The only value the registry allows.
	pub value:  Option<TranslatorRef>,
	/// Arrays are copied element by element.
	pub copy:   bool,
	/// Index of the member holding the length of this one.
	pub length: Option<usize>
}

#[derive(Debug, Clone)]
pub struct CommandData {
	pub name:   TranslatorRef,
	pub ret:    TranslatorRef,
	pub params: Vec<CommandParamData>
}

#[derive(Debug, Clone)]
pub struct CommandParamData {
	pub name:      TranslatorRef,
	pub ty:        TranslatorRef,
	pub type_name: String
}

#[derive(Debug, Clone)]
pub enum Item {
	Const(Vec<ConstData>),
	Version(DefineData),
	HeaderVersion(DefineData),
	Base { name: TranslatorRef, ty: TranslatorRef },
	Handle { name: TranslatorRef, parent: Option<TranslatorRef> },
	Enum(EnumData),
	Bitmask { name: TranslatorRef, ty: TranslatorRef },
	Func { name: TranslatorRef, ty: TranslatorRef },
	Struct(StructData),
	Alias { name: TranslatorRef, alias: TranslatorRef },
	Union { name: TranslatorRef },
	Command(CommandData)
}

impl Item {
	pub fn template(&self) -> &'static str {
		match self {
			Self::Const(_)         => "const",
			Self::Version(_)       => "version",
			Self::HeaderVersion(_) => "headerversion",
			Self::Base { .. }      => "base",
			Self::Handle { .. }    => "handle",
			Self::Enum(_)          => "enum",
			Self::Bitmask { .. }   => "bitmask",
			Self::Func { .. }      => "func",
			Self::Struct(_)        => "struct",
			Self::Alias { .. }     => "structalias",
			Self::Union { .. }     => "union",
			Self::Command(_)       => "command"
		}
	}
}

/// Strips the C suffixes of a constant and turns `~x` into a Go complement.
pub fn const_value(value: &str) -> String {
	let mut value = value;
	if !(value.starts_with("0x") || value.starts_with("0X")) {
		value = value.strip_suffix(|c: char| c == 'F' || c == 'f').unwrap_or(value);
	}

	if value.starts_with('(') && value.ends_with(')') {
		value = &value[1..value.len() - 1];
	}

	let ulonglong = value.ends_with("ULL") || value.ends_with("ull");
	if ulonglong {
		value = &value[..value.len() - 3];
	}

	let ulong = value.ends_with('U') || value.ends_with('u');
	if ulong {
		value = &value[..value.len() - 1];
	}

	match value.strip_prefix('~') {
		Some(v) if ulonglong => format!("^uint64({})", v),
		Some(v) if ulong => format!("^uint32({})", v),
		Some(v) => format!("^{}", v),
		None => value.to_string()
	}
}

fn parse_value(value: &str) -> Option<i128> {
	let (negative, value) = match value.strip_prefix('-') {
		Some(v) => (true, v),
		None => (false, value)
	};

	let value = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(hex) => i128::from_str_radix(hex, 16).ok()?,
		None => value.parse::<i128>().ok()?
	};

	Some(if negative { -value } else { value })
}

/// Builds the items of the Go wrapper module from an emission order.
pub struct ItemBuilder<'a> {
	graph:  &'a RegistryGraph,
	config: &'a Config,
	cache:  TranslatorCache
}

impl<'a> ItemBuilder<'a> {
	/// Caches the translators of every emitted type and command.
	pub fn new(graph: &'a RegistryGraph, config: &'a Config, order: &[NodeId]) -> Self {
		let mut cache = TranslatorCache::new(&config.export_prefixes);
		for id in order {
			cache.declared(graph.node(*id));
		}

		Self { graph, config, cache }
	}

	pub fn cache(&self) -> &TranslatorCache {
		&self.cache
	}

	/// The API constants, including those added by features and extensions.
	pub fn constants(&mut self) -> Item {
		let graph = self.graph;
		let mut list = Vec::new();

		for block in graph.enums_parents(graph.constants()) {
			for e in graph.enum_parents(block).filter_map(|id| graph.node(id).as_enum()) {
				match (&e.value, &e.alias) {
					(Some(value), _) => list.push(ConstData {
						name:  self.cache.named(&e.name),
						value: Rc::new(Literal(const_value(value)))
					}),
					(None, Some(alias)) => list.push(ConstData {
						name:  self.cache.named(&e.name),
						value: self.cache.named(alias)
					}),
					_ => ()
				}
			}
		}

		Item::Const(list)
	}

	pub fn item(&mut self, id: NodeId) -> Option<Item> {
		let graph = self.graph;
		match &graph.node(id).element {
			Element::Type(ty) => self.type_item(id, ty),
			Element::Command(command) => self.command_item(command),
			_ => None
		}
	}

	fn type_item(&mut self, id: NodeId, ty: &TypeElement) -> Option<Item> {
		if let Some(alias) = &ty.alias {
			return match self.cache.cached(alias) {
				Some(alias) => Some(Item::Alias {
					name: match ty.category {
						TypeCategory::Struct => self.cache.structure(&ty.name),
						_ => self.cache.named(&ty.name)
					},
					alias
				}),
				None => {
					log::debug!("`{}` is an alias of `{}`, which is not emitted", ty.name, alias);
					None
				}
			};
		}

		match ty.category {
			TypeCategory::Define => self.define_item(ty),
			TypeCategory::Basetype => self.base_item(ty),
			TypeCategory::Handle => Some(Item::Handle {
				name:   self.cache.named(&ty.name),
				parent: ty.parents().next().map(|v| self.cache.named(v))
			}),
			TypeCategory::Enum => Some(Item::Enum(self.enum_data(id, ty))),
			TypeCategory::Bitmask => Some(Item::Bitmask {
				name: self.cache.named(&ty.name),
				ty:   ty.type_tag()
					.and_then(|v| self.cache.cached(v))
					.unwrap_or_else(|| Rc::new(UINT32))
			}),
			TypeCategory::FuncPointer => Some(Item::Func {
				name: self.cache.named(&ty.name),
				ty:   Rc::new(VOID_PTR)
			}),
			TypeCategory::Struct => Some(Item::Struct(self.struct_data(ty))),
			TypeCategory::Union => Some(Item::Union { name: self.cache.named(&ty.name) }),
			TypeCategory::Include | TypeCategory::Group | TypeCategory::None => None
		}
	}

	fn define_item(&mut self, ty: &TypeElement) -> Option<Item> {
		if SKIPPED_DEFINES.contains(&ty.name.as_str()) || API_VERSION.is_match(&ty.name) {
			log::trace!("skipping define `{}`", ty.name);
			return None;
		}

		let (regex, header) = match ty.name.as_str() {
			"VK_HEADER_VERSION" => (&*TRAILING_NUMBER, true),
			"VK_HEADER_VERSION_COMPLETE" => (&*HEADER_VERSION_COMPLETE, false),
			_ => {
				log::warn!("define `{}` is not handled", ty.name);
				return None;
			}
		};

		let value = match regex.captures(ty.raw.trim()) {
			Some(captures) => captures[1].to_string(),
			None => {
				log::warn!("failed to parse define `{}`: `{}`", ty.name, ty.raw);
				return None;
			}
		};

		let data = DefineData {
			name:           self.cache.define("VK_API_VERSION"),
			header_version: self.cache.define("VK_HEADER_VERSION"),
			value,
			api_versions:   self.config.features.iter()
				.filter_map(|v| FEATURE_VERSION.captures(v))
				.map(|v| (format!("VK_API_VERSION_{}_{}", &v[1], &v[2]), format!("0, {}, {}, 0", &v[1], &v[2])))
				.collect()
		};

		Some(if header { Item::HeaderVersion(data) } else { Item::Version(data) })
	}

	fn base_item(&mut self, ty: &TypeElement) -> Option<Item> {
		let tag = match ty.type_tag() {
			Some("void") if ty.raw.contains('*') => "void*",
			Some(tag) => tag,
			None => {
				log::info!("basetype `{}` has no type", ty.name);
				return None;
			}
		};

		match self.cache.scalar(tag) {
			Some(scalar) => Some(Item::Base { name: self.cache.named(&ty.name), ty: scalar }),
			None => {
				log::info!("basetype `{}` is not a scalar: `{}`", ty.name, tag);
				None
			}
		}
	}

	fn enum_data(&mut self, id: NodeId, ty: &TypeElement) -> EnumData {
		let graph = self.graph;
		let mut values = Vec::new();
		let (mut min, mut max) = (0i128, 0i128);
		let mut wide = false;

		for block in graph.enums_parents(id) {
			wide |= graph.node(block).as_enums().map_or(false, |v| v.bit_width == Some(64));

			for e in graph.enum_parents(block).filter_map(|id| graph.node(id).as_enum()) {
				let mut track = |v: Option<i128>| if let Some(v) = v {
					min = min.min(v);
					max = max.max(v);
				};

				let (value, alias): (TranslatorRef, _) = match (&e.alias, &e.value, e.bit_pos) {
					(Some(alias), _, _) => (self.cache.cached(alias)
						.unwrap_or_else(|| Rc::new(Literal(alias.clone()))), true),
					(None, Some(value), _) => {
						track(parse_value(value));
						(Rc::new(Literal(value.clone())), false)
					}
					(None, None, Some(pos)) => {
						track(1i128.checked_shl(pos));
						(Rc::new(BitValue(pos)), false)
					}
					(None, None, None) => {
						log::warn!("`{}` of `{}` has no value", e.name, ty.name);
						continue;
					}
				};

				values.push(EnumValueData { name: self.cache.named(&e.name), value, alias });
			}
		}

		let scalar = if wide {
			UINT64
		} else if min < 0 && max <= i128::from(i32::MAX) {
			INT32
		} else if min < 0 {
			INT64
		} else if max > i128::from(u32::MAX) {
			UINT64
		} else {
			UINT32
		};

		EnumData { name: self.cache.named(&ty.name), ty: Rc::new(scalar), values }
	}

	fn struct_data(&mut self, ty: &TypeElement) -> StructData {
		let prefixes = self.cache.prefixes();
		let mut members = ty.members.iter()
			.map(|m| {
				let member_ty = self.cache.member_type(&m.type_name, m.len.as_deref(), &m.raw);
				let value = match &m.values {
					Some(v) if m.name == "sType" && !v.contains(',') => Some(Rc::new(Literal(v.clone())) as TranslatorRef),
					_ => None
				};
				let cgo = member_ty.cgo();

				StructMemberData {
					name:   Rc::new(Export::new(Rc::new(ReservedWord(Rc::new(Literal(m.name.clone())))), prefixes.clone())),
					copy:   value.is_none() && (cgo.contains('[') || cgo.contains(']')),
					ty:     member_ty,
					value,
					length: None
				}
			})
			.collect::<Vec<_>>();

		for (i, m) in ty.members.iter().enumerate() {
			match &m.len {
				Some(len) if len != "1" && !len.contains(',') && members[i].ty.go() != "unsafe.Pointer" =>
					members[i].length = ty.members.iter().position(|v| &v.name == len),
				_ => ()
			}
		}

		StructData { name: self.cache.structure(&ty.name), members, read_only: ty.returned_only }
	}

	fn command_item(&mut self, command: &CommandElement) -> Option<Item> {
		if command.alias.is_some() {
			log::trace!("skipping command alias `{}`", command.name());
			return None;
		}

		let ret = self.cache.cached(&command.proto.type_name)
			.unwrap_or_else(|| self.cache.member_type(&command.proto.type_name, None, &command.proto.raw));

		let params = command.params.iter()
			.map(|p| CommandParamData {
				name:      Rc::new(ReservedWord(Rc::new(Literal(p.name.clone())))),
				ty:        self.cache.member_type(&p.type_name, p.len.as_deref(), &p.raw),
				type_name: p.type_name.clone()
			})
			.collect();

		Some(Item::Command(CommandData { name: self.cache.named(command.name()), ret, params }))
	}
}

/// The constants followed by an item per emitted type and command, in emission order.
pub fn build_items(graph: &RegistryGraph, config: &Config, order: &[NodeId]) -> Vec<Item> {
	let mut builder = ItemBuilder::new(graph, config, order);
	let mut items = vec![builder.constants()];
	items.extend(order.iter().filter_map(|id| builder.item(*id)));
	log::debug!("built {} items of {} nodes", items.len(), order.len());
	items
}
