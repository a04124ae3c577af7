//! Builtins compiled into the binary

use super::{BuiltinDescriptor, BuiltinFamily, ConstructAbility, ConstructorKind, Visibility};

const PROCESS_OBJECT_INTERNALS_BINDING_CODE: &str = r#"(function (bindingName) {
  "use strict";
  if (bindingName === "constants") {
    return @processBindingConstants;
  }
  const issue = {
    fs: 3546,
    buffer: 2020,
    natives: 2254,
    uv: 2891,
  }[bindingName];
  if (issue) {
    throw new Error("process.binding(\"" + bindingName + "\") is not implemented yet (issue " + issue + ")");
  }
  throw new TypeError("No such module: " + bindingName);
})"#;

const PROCESS_OBJECT_INTERNALS_GET_STDIO_WRITE_STREAM_CODE: &str = r#"(function (fd_, rawRequire) {
  "use strict";
  var module = { path: "node:process", require: rawRequire };
  var require = (path) => module.require(path);

  const tty = require("node:tty");
  const stream = tty.isatty(fd_)
    ? new tty.WriteStream(fd_)
    : @lazyFileSink(fd_);

  stream.fd = fd_;
  stream._type = tty.isatty(fd_) ? "tty" : "fs";
  if (fd_ === 1 || fd_ === 2) {
    stream._destroy = function (err, cb) {
      cb(err);
    };
  }
  return stream;
})"#;

const PROCESS_OBJECT_INTERNALS_GET_STDIN_STREAM_CODE: &str = r#"(function (fd_, rawRequire, Bun) {
  "use strict";
  var module = { path: "node:process", require: rawRequire };
  var require = (path) => module.require(path);

  var { Duplex, eos, destroy } = require("node:stream");
  var reader;
  var readerRef;

  function ref() {
    reader ??= Bun.stdin.stream().getReader();
    readerRef ??= setInterval(() => {}, 1 << 30);
  }

  function unref() {
    if (readerRef) {
      clearInterval(readerRef);
      readerRef = undefined;
    }
  }

  const stream = new Duplex({ autoDestroy: true, allowHalfOpen: false });
  stream.fd = fd_;
  stream.on("pause", unref);
  stream.on("resume", ref);
  return stream;
})"#;

const CONSOLE_OBJECT_ASYNC_ITERATOR_CODE: &str = r#"(function () {
  "use strict";
  const stream = Bun.stdin.stream();
  var decoder = new TextDecoder("utf-8", { fatal: false });
  var indexOf = Bun.indexOfLine;
  var actualChunk;
  var i = -1;
  var idx;
  var last;
  var done;
  var value;
  var value_len;
  var pendingChunk;

  return (async function* () {
    const reader = stream.getReader();
    try {
      while (true) {
        ({ done, value } = await reader.read());
        if (done) {
          if (pendingChunk) {
            yield decoder.decode(pendingChunk);
          }
          return;
        }
        actualChunk = pendingChunk ? Buffer.concat([pendingChunk, value]) : value;
        last = 0;
        while ((i = indexOf(actualChunk, last)) !== -1) {
          yield decoder.decode(actualChunk.subarray(last, i));
          last = i + 1;
        }
        pendingChunk = actualChunk.subarray(last);
      }
    } finally {
      reader.releaseLock();
    }
  })();
})"#;

const CONSOLE_OBJECT_WRITE_CODE: &str = r#"(function (input) {
  "use strict";
  var writer = @getByIdDirectPrivate(this, "writer");
  if (!writer) {
    var length = @toLength(input?.length ?? 0);
    writer = Bun.stdout.writer({ highWaterMark: length > 65536 ? length : 65536 });
    @putByIdDirectPrivate(this, "writer", writer);
  }

  var wrote = writer.write(input);

  const count = @argumentCount();
  for (var i = 1; i < count; i++) {
    wrote += writer.write(@argument(i));
  }

  writer.flush(true);
  return wrote;
})"#;

/// Process object internals used while bootstrapping `process`
pub static PROCESS_OBJECT_INTERNALS: BuiltinFamily = BuiltinFamily {
    name: "processObjectInternals",
    descriptors: &[
        BuiltinDescriptor {
            family: "processObjectInternals",
            name: "binding",
            source: PROCESS_OBJECT_INTERNALS_BINDING_CODE,
            length: PROCESS_OBJECT_INTERNALS_BINDING_CODE.len(),
            argument_count: 1,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Private,
            override_name: None,
        },
        BuiltinDescriptor {
            family: "processObjectInternals",
            name: "getStdioWriteStream",
            source: PROCESS_OBJECT_INTERNALS_GET_STDIO_WRITE_STREAM_CODE,
            length: PROCESS_OBJECT_INTERNALS_GET_STDIO_WRITE_STREAM_CODE.len(),
            argument_count: 2,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Private,
            override_name: None,
        },
        BuiltinDescriptor {
            family: "processObjectInternals",
            name: "getStdinStream",
            source: PROCESS_OBJECT_INTERNALS_GET_STDIN_STREAM_CODE,
            length: PROCESS_OBJECT_INTERNALS_GET_STDIN_STREAM_CODE.len(),
            argument_count: 3,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Private,
            override_name: None,
        },
    ],
};

/// Public methods of the `console` object
pub static CONSOLE_OBJECT: BuiltinFamily = BuiltinFamily {
    name: "consoleObject",
    descriptors: &[
        BuiltinDescriptor {
            family: "consoleObject",
            name: "asyncIterator",
            source: CONSOLE_OBJECT_ASYNC_ITERATOR_CODE,
            length: CONSOLE_OBJECT_ASYNC_ITERATOR_CODE.len(),
            argument_count: 0,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Public,
            override_name: Some("[Symbol.asyncIterator]"),
        },
        BuiltinDescriptor {
            family: "consoleObject",
            name: "write",
            source: CONSOLE_OBJECT_WRITE_CODE,
            length: CONSOLE_OBJECT_WRITE_CODE.len(),
            argument_count: 1,
            construct_ability: ConstructAbility::CannotConstruct,
            constructor_kind: ConstructorKind::None,
            visibility: Visibility::Public,
            override_name: None,
        },
    ],
};

static FAMILIES: &[&BuiltinFamily] = &[&PROCESS_OBJECT_INTERNALS, &CONSOLE_OBJECT];

/// Every family compiled into the binary, in registration order
pub fn families() -> &'static [&'static BuiltinFamily] {
    FAMILIES
}
