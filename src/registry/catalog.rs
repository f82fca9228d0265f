//! Built-in catalog of the Razen standard libraries.

use phf::phf_map;

use super::{FunctionSpec, ReturnShape};

const fn any(name: &'static str) -> FunctionSpec {
    FunctionSpec {
        name,
        returns: None,
    }
}

const fn num(name: &'static str) -> FunctionSpec {
    FunctionSpec {
        name,
        returns: Some(ReturnShape::Number),
    }
}

const fn text(name: &'static str) -> FunctionSpec {
    FunctionSpec {
        name,
        returns: Some(ReturnShape::Text),
    }
}

const fn boolean(name: &'static str) -> FunctionSpec {
    FunctionSpec {
        name,
        returns: Some(ReturnShape::Boolean),
    }
}

const fn array(name: &'static str) -> FunctionSpec {
    FunctionSpec {
        name,
        returns: Some(ReturnShape::Array),
    }
}

const fn object(name: &'static str) -> FunctionSpec {
    FunctionSpec {
        name,
        returns: Some(ReturnShape::Object),
    }
}

/// Library name (lowercase) → exposed functions.
pub static CATALOG: phf::Map<&'static str, &'static [FunctionSpec]> = phf_map! {
    "arrlib" => &[
        array("push"), any("pop"), text("join"), num("length"), array("unique"),
    ],
    "strlib" => &[
        text("upper"), text("lower"), text("substring"), text("replace"), num("length"),
        array("split"), text("trim"), boolean("starts_with"), boolean("ends_with"),
        boolean("contains"), text("repeat"),
    ],
    "mathlib" => &[
        num("add"), num("subtract"), num("multiply"), num("divide"), num("power"),
        num("sqrt"), num("abs"), num("round"), num("floor"), num("ceil"), num("sin"),
        num("cos"), num("tan"), num("log"), num("exp"), num("random"), num("max"),
        num("min"), num("modulo"),
    ],
    "timelib" => &[
        num("now"), text("format"), num("parse"), num("add"), num("year"), num("month"),
        num("day"),
    ],
    "random" => &[
        num("int"), num("float"), any("choice"), array("shuffle"),
    ],
    "file" => &[
        text("read"), boolean("write"), boolean("append"), boolean("exists"),
        boolean("delete"),
    ],
    "filesystem" => &[
        boolean("exists"), boolean("is_file"), boolean("is_dir"), boolean("create_dir"),
        boolean("remove"), text("read_file"), boolean("write_file"), array("list_dir"),
        object("metadata"), text("absolute_path"), boolean("copy"), boolean("move"),
        text("extension"), text("file_stem"), text("parent_dir"), text("join_path"),
        boolean("change_dir"), text("current_dir"), text("temp_file"), text("temp_dir"),
    ],
    "apilib" => &[
        object("get"), object("post"), object("putmethod"), object("delete"), object("patch"),
        object("call"), any("parse_json"), text("to_json"), object("create_api"),
        object("execute_api"), text("url_encode"), text("url_decode"), object("form_data"),
        boolean("is_success"), boolean("is_client_error"), boolean("is_server_error"),
    ],
    "json" => &[
        any("parse"), text("stringify"),
    ],
    "bolt" => &[
        any("run"), array("parallel"), num("threads"),
    ],
    "seed" => &[
        text("generate"), array("map_seed"), array("noise_map"), text("name"),
    ],
    "memorylib" => &[
        num("addressof"), any("deref"), num("add_offset"), num("alloc"), boolean("free"),
        boolean("write_byte"), num("read_byte"), num("create_buffer"), boolean("free_buffer"),
        boolean("buffer_write_string"), text("buffer_read_string"), boolean("buffer_copy"),
        object("stats"),
    ],
    "binarylib" => &[
        num("create"), num("open"), boolean("close"), num("write_bytes"), array("read_bytes"),
        num("seek"), num("tell"), text("bytes_to_string"), array("string_to_bytes"),
        object("stats"),
    ],
    "bitwiselib" => &[
        num("and"), num("or"), num("xor"), num("not"), num("left_shift"), num("right_shift"),
        num("unsigned_right_shift"), num("get_bit"), num("set_bit"), num("count_bits"),
        text("to_binary"), text("to_hex"), num("from_binary"), num("from_hex"),
    ],
    "systemlib" => &[
        num("getpid"), text("getcwd"), text("execute"), text("getenv"), boolean("setenv"),
        object("environ"), array("args"), boolean("path_exists"), text("realpath"),
        any("exit"), any("sleep"), text("hostname"), text("username"), num("current_time"),
        text("system_name"),
    ],
    "processlib" => &[
        num("create"), num("wait"), boolean("is_running"), boolean("kill"), boolean("signal"),
        object("info"), text("read_stdout"), text("read_stderr"), boolean("write_stdin"),
    ],
    "threadlib" => &[
        num("create"), any("join"), boolean("is_running"), any("sleep"), num("mutex_create"),
        boolean("mutex_lock"), boolean("mutex_unlock"), boolean("mutex_destroy"), num("current"),
        num("cpu_count"), num("thread_id"), num("thread_count"),
    ],
    "compilerlib" => &[
        object("create_node"), object("add_child"), text("node_to_string"),
        object("create_symbol_table"), object("add_symbol"), any("lookup_symbol"),
        array("generate_ir"), array("optimize_ir"), text("generate_assembly"), object("parse"),
        array("tokenize"), text("compile"),
    ],
    "lexerlib" => &[
        object("create_lexer"), array("tokenize"), object("define_token"),
    ],
    "parserlib" => &[
        object("create_parser"), object("parse"), object("define_rule"), object("create_grammar"),
    ],
    "astlib" => &[
        object("create_node"), object("define_node_type"), any("traverse"),
        object("create_visitor"),
    ],
    "symbollib" => &[
        object("create_symbol_table"), object("define_symbol"), object("add_symbol"),
        any("lookup_symbol"),
    ],
    "typelib" => &[
        object("define_type"), boolean("check_type"), object("create_type_system"),
        text("infer_type"),
    ],
    "irlib" => &[
        object("create_instruction"), array("generate"), array("optimize"), text("to_string"),
    ],
    "codegenlib" => &[
        object("create_generator"), text("generate"), object("define_target"), text("emit_code"),
    ],
    "optimizelib" => &[
        object("create_pass"), any("apply"), object("analyze"), object("create_pipeline"),
    ],
    "color" => &[
        array("hex_to_rgb"), text("rgb_to_hex"), text("lighten"), text("darken"),
        text("get_ansi_color"),
    ],
    "crypto" => &[
        text("hash"), text("encrypt"), text("decrypt"),
    ],
    "regex" => &[
        boolean("match"), any("search"), text("replace"),
    ],
    "uuid" => &[
        text("generate"), object("parse"), boolean("is_valid"),
    ],
    "os" => &[
        text("env"), text("cwd"), text("platform"),
    ],
    "validation" => &[
        boolean("email"), boolean("phone"), boolean("required"), boolean("min_length"),
    ],
    "system" => &[
        text("exec"), num("uptime"), object("info"), num("current_time"), text("system_name"),
    ],
    "boxlib" => &[
        object("put"), any("get"), boolean("is_box"),
    ],
    "loglib" => &[
        any("infolog"), any("warnlog"), any("errorlog"), any("debuglog"),
    ],
    "htlib" => &[
        boolean("coin"), text("bool_tos"),
    ],
    "audio" => &[
        boolean("play"), boolean("pause"), boolean("stop"), object("record"),
    ],
    "image" => &[
        object("load"), boolean("save"), object("resize"), object("crop"),
    ],
    "date" => &[
        text("now"), num("year"), num("month"), num("day"), text("format"), num("parse"),
        text("add_days"), text("add_months"), text("add_years"), num("weekday"),
        text("weekday_name"), num("days_in_month"), boolean("is_leap_year"), num("diff_days"),
    ],
    "netlib" => &[
        boolean("ping"), object("get"), object("post"),
    ],
};
