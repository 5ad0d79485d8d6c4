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

//! Typed elements of the `vk.xml` registry.

use {serde::{*, de::Error}, crate::xml::Body};

#[derive(Debug, Clone, Default)]
pub struct Registry {
	pub comments:   Vec<String>,
	pub platforms:  Vec<PlatformElement>,
	pub types:      Vec<TypeElement>,
	pub enums:      Vec<EnumsElement>,
	pub commands:   Vec<CommandElement>,
	pub features:   Vec<FeatureElement>,
	pub extensions: Vec<ExtensionElement>
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlatformElement {
	pub name:    String,
	pub protect: String,
	pub comment: Option<String>
}

#[derive(Debug, Deserialize, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
	Include,
	Define,
	Basetype,
	Handle,
	Enum,
	Group,
	Bitmask,
	FuncPointer,
	Struct,
	Union,
	#[serde(other)]
	None
}

impl Default for TypeCategory {
	fn default() -> Self {
		Self::None
	}
}

impl TypeCategory {
	/// Rank used to order sibling types during traversal.
	pub fn order(self) -> u32 {
		match self {
			Self::Include | Self::None => 0,
			Self::Define      => 1,
			Self::Basetype    => 2,
			Self::Handle      => 3,
			Self::Enum        => 4,
			Self::Group       => 5,
			Self::Bitmask     => 6,
			Self::FuncPointer => 7,
			Self::Struct      => 8,
			Self::Union       => 9
		}
	}

	/// Dependencies of terminal types are not traversed.
	pub fn is_terminal(self) -> bool {
		matches!(self, Self::Include | Self::Enum)
	}
}

#[derive(Debug, Clone, Default)]
pub struct TypeElement {
	pub name:           String,
	pub category:       TypeCategory,
	pub requires:       Option<String>,
	pub alias:          Option<String>,
	pub api:            Option<String>,
	pub parent:         Option<String>,
	pub returned_only:  bool,
	pub struct_extends: Option<String>,
	pub obj_type_enum:  Option<String>,
	pub bit_values:     Option<String>,
	/// Every `<type>` child, in order.
	pub type_tags:      Vec<String>,
	pub members:        Vec<TypeMember>,
	pub comment:        Option<String>,
	/// The body text without child tags.
	pub raw:            String
}

impl TypeElement {
	/// Compares everything but members and comments.
	pub fn same_definition(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.category == other.category
			&& self.requires == other.requires
			&& self.alias == other.alias
			&& self.api == other.api
			&& self.parent == other.parent
			&& self.returned_only == other.returned_only
			&& self.struct_extends == other.struct_extends
			&& self.obj_type_enum == other.obj_type_enum
			&& self.bit_values == other.bit_values
			&& self.type_tags == other.type_tags
			&& self.raw == other.raw
	}

	pub fn type_tag(&self) -> Option<&str> {
		self.type_tags.first().map(String::as_str)
	}

	/// The `parent` attribute may list several handles.
	pub fn parents(&self) -> impl Iterator<Item = &str> {
		list(&self.parent)
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMember {
	pub name:      String,
	pub type_name: String,
	pub api:       Option<String>,
	pub values:    Option<String>,
	pub len:       Option<String>,
	pub alt_len:   Option<String>,
	pub optional:  Option<String>,
	pub enum_ref:  Option<String>,
	pub comment:   Option<String>,
	/// Text and enum references around the type and name, e.g. `const*` or `[VK_UUID_SIZE]`.
	pub raw:       String
}

#[derive(Debug, Deserialize, Eq, PartialEq, Copy, Clone)]
#[serde(rename_all = "lowercase")]
pub enum EnumsType {
	Enum,
	Bitmask,
	#[serde(other)]
	None
}

impl Default for EnumsType {
	fn default() -> Self {
		Self::None
	}
}

#[derive(Debug, Clone, Default)]
pub struct EnumsElement {
	pub name:      String,
	pub kind:      EnumsType,
	pub comment:   Option<String>,
	pub bit_width: Option<u32>,
	pub enums:     Vec<EnumElement>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnumElement {
	pub name:       String,
	pub value:      Option<String>,
	#[serde(rename = "bitpos")]
	pub bit_pos:    Option<u32>,
	pub alias:      Option<String>,
	pub api:        Option<String>,
	#[serde(rename = "type")]
	pub type_attr:  Option<String>,
	pub deprecated: Option<String>,
	pub protect:    Option<String>,
	pub comment:    Option<String>
}

impl EnumElement {
	pub fn same_definition(&self, other: &Self) -> bool {
		self.name == other.name
			&& self.value == other.value
			&& self.bit_pos == other.bit_pos
			&& self.alias == other.alias
			&& self.api == other.api
			&& self.type_attr == other.type_attr
			&& self.deprecated == other.deprecated
			&& self.protect == other.protect
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequireEnum {
	pub element:    EnumElement,
	pub extends:    Option<String>,
	pub ext_number: Option<u32>,
	pub offset:     Option<u32>,
	pub dir:        Option<String>
}

impl RequireEnum {
	pub fn name(&self) -> &str {
		&self.element.name
	}

	/// A reference only names an enum defined elsewhere.
	pub fn is_reference(&self) -> bool {
		self.element.value.is_none()
			&& self.element.bit_pos.is_none()
			&& self.element.alias.is_none()
			&& self.offset.is_none()
	}
}

#[derive(Debug, Clone, Default)]
pub struct RequireElement {
	pub api:      Option<String>,
	pub depends:  Option<String>,
	pub comment:  Option<String>,
	pub commands: Vec<String>,
	pub types:    Vec<String>,
	pub enums:    Vec<RequireEnum>
}

#[derive(Debug, Clone, Default)]
pub struct FeatureElement {
	pub api:     Option<String>,
	pub name:    String,
	pub number:  String,
	pub comment: Option<String>,
	pub require: Vec<RequireElement>
}

#[derive(Debug, Clone, Default)]
pub struct ExtensionElement {
	pub name:          String,
	pub number:        u32,
	pub ext_type:      Option<String>,
	pub supported:     Option<String>,
	/// A dependency expression, `+` is a conjunction and `,` a disjunction.
	pub depends:       Option<String>,
	pub platform:      Option<String>,
	pub promoted_to:   Option<String>,
	pub deprecated_by: Option<String>,
	pub provisional:   bool,
	pub comment:       Option<String>,
	pub require:       Vec<RequireElement>
}

#[derive(Debug, Clone, Default)]
pub struct CommandElement {
	pub alias:         Option<String>,
	pub name_attr:     Option<String>,
	pub api:           Option<String>,
	pub proto:         CommandProto,
	pub params:        Vec<CommandParam>,
	pub success_codes: Option<String>,
	pub error_codes:   Option<String>,
	pub comment:       Option<String>
}

impl CommandElement {
	/// Aliases carry their name as an attribute, everything else in the prototype.
	pub fn name(&self) -> &str {
		match (&self.alias, &self.name_attr) {
			(Some(_), Some(name)) => name,
			_ => &self.proto.name
		}
	}
}

#[derive(Debug, Clone, Default)]
pub struct CommandProto {
	pub type_name: String,
	pub name:      String,
	pub raw:       String
}

#[derive(Debug, Clone, Default)]
pub struct CommandParam {
	pub name:      String,
	pub type_name: String,
	pub api:       Option<String>,
	pub len:       Option<String>,
	pub alt_len:   Option<String>,
	pub optional:  Option<String>,
	pub raw:       String
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommentVariant {
	Attr(String),
	Body(Body<String>)
}

impl From<CommentVariant> for String {
	fn from(v: CommentVariant) -> Self {
		match v {
			CommentVariant::Attr(v) => v,
			CommentVariant::Body(v) => v.value
		}
	}
}

#[derive(Debug, Deserialize)]
struct NameRef {
	name: String
}

fn list(v: &Option<String>) -> impl Iterator<Item = &str> {
	v.as_deref()
		.into_iter()
		.flat_map(|v| v.split(','))
		.map(str::trim)
		.filter(|v| !v.is_empty())
}

/// Elements without an `api` attribute belong to every API.
pub fn api_matches(attr: &Option<String>, api: &str) -> bool {
	attr.as_ref().map_or(true, |_| list(attr).any(|v| v == api))
}

impl Registry {
	/// Removes everything that doesn't belong to `api`.
	pub fn for_api(mut self, api: &str) -> Self {
		self.types.retain(|v| api_matches(&v.api, api));
		self.types.iter_mut().for_each(|v| v.members.retain(|m| api_matches(&m.api, api)));
		self.enums.iter_mut().for_each(|v| v.enums.retain(|e| api_matches(&e.api, api)));
		self.commands.retain(|v| api_matches(&v.api, api));
		self.commands.iter_mut().for_each(|v| v.params.retain(|p| api_matches(&p.api, api)));

		let filter_require = |require: &mut Vec<RequireElement>| {
			require.retain(|r| api_matches(&r.api, api));
			require.iter_mut().for_each(|r| r.enums.retain(|e| api_matches(&e.element.api, api)));
		};

		self.features.retain(|v| api_matches(&v.api, api));
		self.features.iter_mut().for_each(|v| filter_require(&mut v.require));
		self.extensions.retain(|v| list(&v.supported).any(|s| s == api));
		self.extensions.iter_mut().for_each(|v| filter_require(&mut v.require));
		self
	}
}

impl<'de> Deserialize<'de> for Registry {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Comment(Body<String>),
			Platforms(Vec<PlatformsVal>),
			Types(Vec<TypesVal>),
			Enums(EnumsElement),
			Commands(Vec<CommandsVal>),
			Feature(FeatureElement),
			Extensions(Vec<ExtensionsVal>),
			#[serde(other)]
			Other
		}

		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum PlatformsVal {
			Platform(PlatformElement),
			#[serde(other)]
			Other
		}

		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum TypesVal {
			Type(TypeElement),
			#[serde(other)]
			Other
		}

		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum CommandsVal {
			Command(CommandElement),
			#[serde(other)]
			Other
		}

		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum ExtensionsVal {
			Extension(ExtensionElement),
			#[serde(other)]
			Other
		}

		let mut registry = Registry::default();

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Comment(v) => registry.comments.push(v.value),
				Val::Platforms(v) => registry.platforms.extend(v.into_iter()
					.filter_map(|v| match v { PlatformsVal::Platform(v) => Some(v), _ => None })),
				Val::Types(v) => registry.types.extend(v.into_iter()
					.filter_map(|v| match v { TypesVal::Type(v) => Some(v), _ => None })),
				Val::Enums(v) => registry.enums.push(v),
				Val::Commands(v) => registry.commands.extend(v.into_iter()
					.filter_map(|v| match v { CommandsVal::Command(v) => Some(v), _ => None })),
				Val::Feature(v) => registry.features.push(v),
				Val::Extensions(v) => registry.extensions.extend(v.into_iter()
					.filter_map(|v| match v { ExtensionsVal::Extension(v) => Some(v), _ => None })),
				Val::Other => ()
			}
		}

		log::debug!(
			"registry: {} types, {} enums blocks, {} commands, {} features, {} extensions",
			registry.types.len(),
			registry.enums.len(),
			registry.commands.len(),
			registry.features.len(),
			registry.extensions.len()
		);

		Ok(registry)
	}
}

impl<'de> Deserialize<'de> for TypeElement {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Name(CommentVariant),
			Category(TypeCategory),
			Requires(String),
			Alias(String),
			Api(String),
			Parent(String),
			ReturnedOnly(String),
			StructExtends(String),
			ObjTypeEnum(String),
			BitValues(String),
			Type(Body<String>),
			Member(TypeMember),
			Comment(CommentVariant),
			#[serde(rename = "$value")]
			Body(String),
			#[serde(other)]
			Other
		}

		let mut ty = TypeElement::default();
		let mut name = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Name(v) => name = Some(String::from(v)),
				Val::Category(v) => ty.category = v,
				Val::Requires(v) => ty.requires = Some(v),
				Val::Alias(v) => ty.alias = Some(v),
				Val::Api(v) => ty.api = Some(v),
				Val::Parent(v) => ty.parent = Some(v),
				Val::ReturnedOnly(v) => ty.returned_only = v == "true",
				Val::StructExtends(v) => ty.struct_extends = Some(v),
				Val::ObjTypeEnum(v) => ty.obj_type_enum = Some(v),
				Val::BitValues(v) => ty.bit_values = Some(v),
				Val::Type(v) => ty.type_tags.push(v.value),
				Val::Member(v) => ty.members.push(v),
				// struct bodies interleave comment tags with members
				Val::Comment(CommentVariant::Attr(v)) => ty.comment = Some(v),
				Val::Comment(CommentVariant::Body(_)) => (),
				Val::Body(v) => ty.raw.push_str(&v),
				Val::Other => ()
			}
		}

		ty.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		Ok(ty)
	}
}

impl<'de> Deserialize<'de> for TypeMember {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Type(Body<String>),
			Name(Body<String>),
			Comment(CommentVariant),
			Enum(Body<String>),
			#[serde(rename = "$value")]
			Body(String),
			Api(String),
			Values(String),
			Len(String),
			AltLen(String),
			Optional(String),
			#[serde(other)]
			Other
		}

		let mut member = TypeMember::default();
		let mut name = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Type(v) => member.type_name = v.value,
				Val::Name(v) => name = Some(v.value),
				Val::Comment(v) => member.comment = Some(v.into()),
				Val::Enum(v) => {
					member.raw.push_str(&v.value);
					member.enum_ref = Some(v.value);
				}
				Val::Body(v) => member.raw.push_str(&v),
				Val::Api(v) => member.api = Some(v),
				Val::Values(v) => member.values = Some(v),
				Val::Len(v) => member.len = Some(v),
				Val::AltLen(v) => member.alt_len = Some(v),
				Val::Optional(v) => member.optional = Some(v),
				Val::Other => ()
			}
		}

		member.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		Ok(member)
	}
}

impl<'de> Deserialize<'de> for EnumsElement {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Name(String),
			Type(EnumsType),
			Comment(CommentVariant),
			BitWidth(u32),
			Enum(EnumElement),
			#[serde(other)]
			Other
		}

		let mut enums = EnumsElement::default();
		let mut name = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Name(v) => name = Some(v),
				Val::Type(v) => enums.kind = v,
				Val::Comment(CommentVariant::Attr(v)) => enums.comment = Some(v),
				Val::Comment(CommentVariant::Body(_)) => (),
				Val::BitWidth(v) => enums.bit_width = Some(v),
				Val::Enum(v) => enums.enums.push(v),
				Val::Other => ()
			}
		}

		enums.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		Ok(enums)
	}
}

impl<'de> Deserialize<'de> for RequireEnum {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		struct Val {
			name:       String,
			value:      Option<String>,
			bitpos:     Option<u32>,
			alias:      Option<String>,
			api:        Option<String>,
			#[serde(rename = "type")]
			type_attr:  Option<String>,
			deprecated: Option<String>,
			protect:    Option<String>,
			comment:    Option<String>,
			extends:    Option<String>,
			extnumber:  Option<u32>,
			offset:     Option<u32>,
			dir:        Option<String>
		}

		let v = Val::deserialize(deserializer)?;
		Ok(Self {
			element: EnumElement {
				name:       v.name,
				value:      v.value,
				bit_pos:    v.bitpos,
				alias:      v.alias,
				api:        v.api,
				type_attr:  v.type_attr,
				deprecated: v.deprecated,
				protect:    v.protect,
				comment:    v.comment
			},
			extends:    v.extends,
			ext_number: v.extnumber,
			offset:     v.offset,
			dir:        v.dir
		})
	}
}

/// Joins the legacy `feature`/`extension` attributes of a require block into one conjunction.
fn join_depends(depends: Option<String>, legacy: Vec<String>) -> Option<String> {
	depends.into_iter()
		.chain(legacy)
		.reduce(|a, b| format!("{}+{}", a, b))
}

impl<'de> Deserialize<'de> for RequireElement {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Api(String),
			Depends(String),
			Feature(String),
			Extension(String),
			Comment(CommentVariant),
			Command(NameRef),
			Type(NameRef),
			Enum(RequireEnum),
			#[serde(other)]
			Other
		}

		let mut require = RequireElement::default();
		let mut depends = None;
		let mut legacy = Vec::new();

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Api(v) => require.api = Some(v),
				Val::Depends(v) => depends = Some(v),
				Val::Feature(v) | Val::Extension(v) => legacy.push(v),
				Val::Comment(CommentVariant::Attr(v)) => require.comment = Some(v),
				Val::Comment(CommentVariant::Body(_)) => (),
				Val::Command(v) => require.commands.push(v.name),
				Val::Type(v) => require.types.push(v.name),
				Val::Enum(v) => require.enums.push(v),
				Val::Other => ()
			}
		}

		require.depends = join_depends(depends, legacy);
		Ok(require)
	}
}

impl<'de> Deserialize<'de> for FeatureElement {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Api(String),
			Name(String),
			Number(String),
			Comment(CommentVariant),
			Require(RequireElement),
			#[serde(other)]
			Other
		}

		let mut feature = FeatureElement::default();
		let mut name = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Api(v) => feature.api = Some(v),
				Val::Name(v) => name = Some(v),
				Val::Number(v) => feature.number = v,
				Val::Comment(v) => feature.comment = Some(v.into()),
				Val::Require(v) => feature.require.push(v),
				Val::Other => ()
			}
		}

		feature.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		Ok(feature)
	}
}

impl<'de> Deserialize<'de> for ExtensionElement {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Name(String),
			Number(u32),
			Type(String),
			Supported(String),
			Depends(String),
			Requires(String),
			RequiresCore(String),
			Platform(String),
			PromotedTo(String),
			DeprecatedBy(String),
			Provisional(String),
			Comment(CommentVariant),
			Require(RequireElement),
			#[serde(other)]
			Other
		}

		let mut ext = ExtensionElement::default();
		let mut name = None;
		let mut number = None;
		let mut depends = None;
		let mut legacy = Vec::new();

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Name(v) => name = Some(v),
				Val::Number(v) => number = Some(v),
				Val::Type(v) => ext.ext_type = Some(v),
				Val::Supported(v) => ext.supported = Some(v),
				Val::Depends(v) => depends = Some(v),
				Val::Requires(v) => legacy.extend(v.split(',').map(|v| v.trim().to_string())),
				Val::RequiresCore(v) => legacy.push(v),
				Val::Platform(v) => ext.platform = Some(v),
				Val::PromotedTo(v) => ext.promoted_to = Some(v),
				Val::DeprecatedBy(v) => ext.deprecated_by = Some(v),
				Val::Provisional(v) => ext.provisional = v == "true",
				Val::Comment(v) => ext.comment = Some(v.into()),
				Val::Require(v) => ext.require.push(v),
				Val::Other => ()
			}
		}

		ext.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		ext.number = number.ok_or_else(|| D::Error::missing_field("number"))?;
		ext.depends = join_depends(depends, legacy);
		Ok(ext)
	}
}

impl<'de> Deserialize<'de> for CommandElement {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Name(String),
			Alias(String),
			Api(String),
			SuccessCodes(String),
			ErrorCodes(String),
			Comment(CommentVariant),
			Proto(CommandProto),
			Param(CommandParam),
			#[serde(other)]
			Other
		}

		let mut command = CommandElement::default();
		let mut proto = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Name(v) => command.name_attr = Some(v),
				Val::Alias(v) => command.alias = Some(v),
				Val::Api(v) => command.api = Some(v),
				Val::SuccessCodes(v) => command.success_codes = Some(v),
				Val::ErrorCodes(v) => command.error_codes = Some(v),
				Val::Comment(v) => command.comment = Some(v.into()),
				Val::Proto(v) => proto = Some(v),
				Val::Param(v) => command.params.push(v),
				Val::Other => ()
			}
		}

		match (proto, &command.alias, &command.name_attr) {
			(Some(proto), _, _) => command.proto = proto,
			(None, Some(_), Some(_)) => (),
			_ => return Err(D::Error::custom("a command requires either a prototype or a name and an alias"))
		}

		Ok(command)
	}
}

impl<'de> Deserialize<'de> for CommandProto {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Type(Body<String>),
			Name(Body<String>),
			#[serde(rename = "$value")]
			Body(String),
			#[serde(other)]
			Other
		}

		let mut proto = CommandProto::default();
		let mut name = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Type(v) => proto.type_name = v.value,
				Val::Name(v) => name = Some(v.value),
				Val::Body(v) => proto.raw.push_str(&v),
				Val::Other => ()
			}
		}

		proto.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		Ok(proto)
	}
}

impl<'de> Deserialize<'de> for CommandParam {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(rename_all = "lowercase")]
		enum Val {
			Type(Body<String>),
			Name(Body<String>),
			#[serde(rename = "$value")]
			Body(String),
			Api(String),
			Len(String),
			AltLen(String),
			Optional(String),
			#[serde(other)]
			Other
		}

		let mut param = CommandParam::default();
		let mut name = None;

		for e in Vec::<Val>::deserialize(deserializer)? {
			match e {
				Val::Type(v) => param.type_name = v.value,
				Val::Name(v) => name = Some(v.value),
				Val::Body(v) => param.raw.push_str(&v),
				Val::Api(v) => param.api = Some(v),
				Val::Len(v) => param.len = Some(v),
				Val::AltLen(v) => param.alt_len = Some(v),
				Val::Optional(v) => param.optional = Some(v),
				Val::Other => ()
			}
		}

		param.name = name.ok_or_else(|| D::Error::missing_field("name"))?;
		Ok(param)
	}
}

#[cfg(test)]
mod tests {
	use {super::*, crate::xml};

	const REGISTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
	<comment>Copyright notice</comment>
	<platforms comment="platform list">
		<platform name="xlib" protect="VK_USE_PLATFORM_XLIB_KHR" comment="X Window System"/>
	</platforms>
	<types comment="Vulkan type definitions">
		<type name="vk_platform" category="include">#include "vk_platform.h"</type>
		<type api="vulkan" category="define">// Version of this file
#define <name>VK_HEADER_VERSION</name> 250</type>
		<type api="vulkansc" category="define">// Version of this file
#define <name>VK_HEADER_VERSION</name> 12</type>
		<type category="basetype">typedef <type>uint32_t</type> <name>VkBool32</name>;</type>
		<type category="handle" parent="VkInstance" objtypeenum="VK_OBJECT_TYPE_PHYSICAL_DEVICE"><type>VK_DEFINE_HANDLE</type>(<name>VkPhysicalDevice</name>)</type>
		<type name="VkResult" category="enum"/>
		<comment>Struct types</comment>
		<type category="struct" name="VkPhysicalDeviceProperties" returnedonly="true">
			<member><type>uint32_t</type> <name>apiVersion</name></member>
			<member><type>char</type> <name>deviceName</name>[<enum>VK_MAX_PHYSICAL_DEVICE_NAME_SIZE</enum>]</member>
			<member api="vulkansc"><type>uint32_t</type> <name>scOnly</name></member>
			<comment>trailing comment</comment>
		</type>
		<type category="struct" name="VkApplicationInfo">
			<member values="VK_STRUCTURE_TYPE_APPLICATION_INFO"><type>VkStructureType</type> <name>sType</name></member>
			<member optional="true">const <type>void</type>* <name>pNext</name></member>
			<member optional="true" len="null-terminated">const <type>char</type>* <name>pApplicationName</name></member>
		</type>
	</types>
	<enums name="API Constants" comment="Vulkan hardcoded constants">
		<enum type="uint32_t" value="256" name="VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"/>
		<enum type="float" value="1000.0F" name="VK_LOD_CLAMP_NONE"/>
	</enums>
	<enums name="VkResult" type="enum" comment="API result codes">
		<enum value="0" name="VK_SUCCESS" comment="Command completed successfully"/>
		<enum value="-1" name="VK_ERROR_OUT_OF_HOST_MEMORY"/>
		<unused start="-12"/>
	</enums>
	<commands comment="Vulkan command definitions">
		<command successcodes="VK_SUCCESS" errorcodes="VK_ERROR_OUT_OF_HOST_MEMORY">
			<proto><type>VkResult</type> <name>vkEnumeratePhysicalDevices</name></proto>
			<param><type>VkInstance</type> <name>instance</name></param>
			<param optional="false,true"><type>uint32_t</type>* <name>pPhysicalDeviceCount</name></param>
			<param optional="true" len="pPhysicalDeviceCount"><type>VkPhysicalDevice</type>* <name>pPhysicalDevices</name></param>
		</command>
		<command name="vkEnumeratePhysicalDevicesKHR" alias="vkEnumeratePhysicalDevices"/>
	</commands>
	<feature api="vulkan,vulkansc" name="VK_VERSION_1_0" number="1.0" comment="Vulkan core API interface definitions">
		<require comment="Header boilerplate">
			<type name="vk_platform"/>
			<enum name="VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"/>
		</require>
		<require>
			<command name="vkEnumeratePhysicalDevices"/>
		</require>
	</feature>
	<extensions comment="Vulkan extension interface definitions">
		<extension name="VK_KHR_surface" number="1" type="instance" supported="vulkan,vulkansc" platform="xlib" requires="VK_KHR_a,VK_KHR_b">
			<require>
				<enum value="25" name="VK_KHR_SURFACE_SPEC_VERSION"/>
				<enum offset="0" dir="-" extends="VkResult" name="VK_ERROR_SURFACE_LOST_KHR"/>
			</require>
			<require depends="VK_VERSION_1_1">
				<type name="VkBool32"/>
			</require>
		</extension>
		<extension name="VK_KHR_disabled" number="2" supported="disabled"/>
	</extensions>
</registry>
"#;

	fn registry() -> Registry {
		xml::deserialize(REGISTRY.as_bytes()).unwrap()
	}

	#[test]
	fn reads_every_section() {
		let registry = registry();
		assert_eq!(registry.comments, vec!["Copyright notice"]);
		assert_eq!(registry.platforms[0].protect, "VK_USE_PLATFORM_XLIB_KHR");
		assert_eq!(registry.types.len(), 8);
		assert_eq!(registry.enums.len(), 2);
		assert_eq!(registry.commands.len(), 2);
		assert_eq!(registry.features.len(), 1);
		assert_eq!(registry.extensions.len(), 2);
	}

	#[test]
	fn reads_type_names_from_attribute_or_tag() {
		let registry = registry();
		let names = registry.types.iter().map(|t| t.name.as_str()).collect::<Vec<_>>();
		assert_eq!(names, vec![
			"vk_platform",
			"VK_HEADER_VERSION",
			"VK_HEADER_VERSION",
			"VkBool32",
			"VkPhysicalDevice",
			"VkResult",
			"VkPhysicalDeviceProperties",
			"VkApplicationInfo"
		]);

		let bool32 = &registry.types[3];
		assert_eq!(bool32.category, TypeCategory::Basetype);
		assert_eq!(bool32.type_tag(), Some("uint32_t"));
		assert_eq!(bool32.raw, "typedef;");

		let handle = &registry.types[4];
		assert_eq!(handle.parents().collect::<Vec<_>>(), vec!["VkInstance"]);
		assert_eq!(handle.obj_type_enum.as_deref(), Some("VK_OBJECT_TYPE_PHYSICAL_DEVICE"));
		assert!(registry.types[1].raw.ends_with("250"));
	}

	#[test]
	fn reads_struct_members() {
		let registry = registry();
		let props = &registry.types[6];
		assert!(props.returned_only);
		assert_eq!(props.members.len(), 3);
		assert_eq!(props.members[1].name, "deviceName");
		assert_eq!(props.members[1].raw, "[VK_MAX_PHYSICAL_DEVICE_NAME_SIZE]");
		assert_eq!(props.members[1].enum_ref.as_deref(), Some("VK_MAX_PHYSICAL_DEVICE_NAME_SIZE"));

		let info = &registry.types[7];
		assert_eq!(info.members[0].values.as_deref(), Some("VK_STRUCTURE_TYPE_APPLICATION_INFO"));
		assert_eq!(info.members[1].type_name, "void");
		assert_eq!(info.members[1].raw, "const*");
		assert_eq!(info.members[2].len.as_deref(), Some("null-terminated"));
	}

	#[test]
	fn reads_enums_and_commands() {
		let registry = registry();
		let result = &registry.enums[1];
		assert_eq!(result.kind, EnumsType::Enum);
		assert_eq!(result.enums.len(), 2);
		assert_eq!(result.enums[1].value.as_deref(), Some("-1"));
		assert_eq!(registry.enums[0].kind, EnumsType::None);

		let command = &registry.commands[0];
		assert_eq!(command.name(), "vkEnumeratePhysicalDevices");
		assert_eq!(command.proto.type_name, "VkResult");
		assert_eq!(command.params.len(), 3);
		assert_eq!(command.params[1].raw, "*");
		assert_eq!(command.params[2].len.as_deref(), Some("pPhysicalDeviceCount"));
		assert_eq!(registry.commands[1].name(), "vkEnumeratePhysicalDevicesKHR");
		assert_eq!(registry.commands[1].alias.as_deref(), Some("vkEnumeratePhysicalDevices"));
	}

	#[test]
	fn reads_features_and_extensions() {
		let registry = registry();
		let feature = &registry.features[0];
		assert_eq!(feature.require.len(), 2);
		assert_eq!(feature.require[0].types, vec!["vk_platform"]);
		assert!(feature.require[0].enums[0].is_reference());
		assert_eq!(feature.require[1].commands, vec!["vkEnumeratePhysicalDevices"]);

		let surface = &registry.extensions[0];
		assert_eq!(surface.number, 1);
		assert_eq!(surface.depends.as_deref(), Some("VK_KHR_a+VK_KHR_b"));
		assert_eq!(surface.platform.as_deref(), Some("xlib"));
		let lost = &surface.require[0].enums[1];
		assert!(!lost.is_reference());
		assert_eq!(lost.extends.as_deref(), Some("VkResult"));
		assert_eq!(lost.offset, Some(0));
		assert_eq!(lost.dir.as_deref(), Some("-"));
		assert_eq!(surface.require[1].depends.as_deref(), Some("VK_VERSION_1_1"));
	}

	#[test]
	fn filters_by_api() {
		let registry = registry().for_api("vulkan");
		assert_eq!(registry.types.len(), 7);
		assert!(registry.types[1].raw.ends_with("250"));
		assert_eq!(registry.types[5].members.len(), 2);
		assert_eq!(registry.features.len(), 1);
		assert_eq!(registry.extensions.len(), 1);
		assert_eq!(registry.extensions[0].name, "VK_KHR_surface");
	}

	#[test]
	fn matches_api_lists() {
		assert!(api_matches(&None, "vulkan"));
		assert!(api_matches(&Some("vulkan,vulkansc".to_string()), "vulkansc"));
		assert!(!api_matches(&Some("vulkansc".to_string()), "vulkan"));
	}
}
